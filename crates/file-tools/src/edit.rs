//! Edit File Tool
//!
//! Exact-text replacement, or file creation when the target is missing and
//! `old_str` is empty. Every occurrence of `old_str` is replaced.

use std::path::Path;

use agent_core::{ParameterSchema, ToolError, ToolSchema};
use serde::Deserialize;

use crate::error::FileToolError;

pub const NAME: &str = "edit_file";

#[derive(Debug, Deserialize)]
pub struct EditFileInput {
    pub path: String,
    pub old_str: String,
    pub new_str: String,
}

pub fn schema() -> ToolSchema {
    ToolSchema {
        name: NAME.into(),
        description: "Make edits to a text file. Replaces every occurrence of 'old_str' with \
                      'new_str' in the given file. 'old_str' and 'new_str' MUST be different \
                      from each other. If the file specified with path doesn't exist and \
                      'old_str' is empty, the file is created with 'new_str' as its content. \
                      An empty 'old_str' on an existing file changes nothing and returns OK."
            .into(),
        parameters: vec![
            ParameterSchema::required("path", "The path to the file"),
            ParameterSchema::required(
                "old_str",
                "Text to search for - must match exactly. Empty to create a new file.",
            ),
            ParameterSchema::required("new_str", "Text to replace old_str with"),
        ],
    }
}

pub async fn edit_file(input: &serde_json::Value) -> Result<String, ToolError> {
    let input: EditFileInput = serde_json::from_value(input.clone())?;
    if input.path.is_empty() || input.old_str == input.new_str {
        return Err(ToolError::InvalidInput);
    }

    let path = Path::new(&input.path);
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if input.old_str.is_empty() {
                return create_file(path, &input.new_str).await;
            }
            return Err(FileToolError::FileNotFound.into());
        }
        Err(e) => return Err(e.into()),
    };

    // An empty `old_str` matches nothing in an existing file
    if input.old_str.is_empty() {
        tracing::debug!(path = %input.path, "Empty old_str, file left untouched");
        return Ok("OK".into());
    }

    let updated = content.replace(&input.old_str, &input.new_str);
    if updated == content {
        return Err(FileToolError::OldStrNotFound.into());
    }

    tokio::fs::write(path, updated).await?;
    tracing::debug!(path = %input.path, "Edited file");

    Ok("OK".into())
}

async fn create_file(path: &Path, content: &str) -> Result<String, ToolError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    tokio::fs::write(path, content).await?;
    tracing::debug!(path = %path.display(), "Created file");

    Ok(format!("Successfully created file {}", path.display()))
}
