//! Error Types for File Tools

use agent_core::ToolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileToolError {
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("file not found")]
    FileNotFound,

    #[error("old_str not found in file")]
    OldStrNotFound,

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to list {path}: {source}")]
    Walk {
        path: String,
        source: walkdir::Error,
    },
}

impl From<FileToolError> for ToolError {
    fn from(err: FileToolError) -> Self {
        ToolError::failed(err)
    }
}
