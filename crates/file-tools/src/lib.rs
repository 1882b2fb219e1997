//! # file-tools
//!
//! The three filesystem tools the model can call:
//!
//! | tool         | arguments                  | result                          |
//! |--------------|----------------------------|---------------------------------|
//! | `list_files` | `path?`                    | JSON array, dirs end with `/`   |
//! | `read_file`  | `path`                     | file content                    |
//! | `edit_file`  | `path`, `old_str`, `new_str` | `OK` or creation message      |
//!
//! Paths are taken relative to the process working directory and are not
//! sandboxed.

pub mod edit;
pub mod error;
pub mod list;
pub mod read;

use std::sync::Arc;

use agent_core::{Tool, ToolError, ToolRegistry, ToolSchema};
use async_trait::async_trait;

pub use error::FileToolError;

/// The closed set of built-in tools
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileTool {
    ListFiles,
    ReadFile,
    EditFile,
}

impl FileTool {
    /// Every tool, in the order it is offered to the model
    pub const ALL: [FileTool; 3] = [FileTool::ReadFile, FileTool::ListFiles, FileTool::EditFile];

    pub fn name(self) -> &'static str {
        match self {
            FileTool::ListFiles => list::NAME,
            FileTool::ReadFile => read::NAME,
            FileTool::EditFile => edit::NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

#[async_trait]
impl Tool for FileTool {
    fn schema(&self) -> ToolSchema {
        match self {
            FileTool::ListFiles => list::schema(),
            FileTool::ReadFile => read::schema(),
            FileTool::EditFile => edit::schema(),
        }
    }

    async fn execute(&self, input: &serde_json::Value) -> Result<String, ToolError> {
        match self {
            FileTool::ListFiles => list::list_files(input).await,
            FileTool::ReadFile => read::read_file(input).await,
            FileTool::EditFile => edit::edit_file(input).await,
        }
    }
}

/// Registry holding every [`FileTool`]
pub fn registry() -> agent_core::Result<ToolRegistry> {
    ToolRegistry::from_tools(FileTool::ALL.into_iter().map(|t| Arc::new(t) as Arc<dyn Tool>))
}
