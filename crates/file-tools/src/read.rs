//! Read File Tool

use agent_core::{ParameterSchema, ToolError, ToolSchema};
use serde::Deserialize;

use crate::error::FileToolError;

pub const NAME: &str = "read_file";

#[derive(Debug, Deserialize)]
pub struct ReadFileInput {
    pub path: String,
}

pub fn schema() -> ToolSchema {
    ToolSchema {
        name: NAME.into(),
        description: "Read the contents of a given relative file path. Use this when you want \
                      to see what's inside a file. Do not use this with directory names."
            .into(),
        parameters: vec![ParameterSchema::required(
            "path",
            "The relative path of a file in the working directory.",
        )],
    }
}

pub async fn read_file(input: &serde_json::Value) -> Result<String, ToolError> {
    let input: ReadFileInput = serde_json::from_value(input.clone())?;
    if input.path.is_empty() {
        return Err(ToolError::InvalidInput);
    }

    // Directories are not special-cased; the OS read error is reported as-is.
    let content = tokio::fs::read_to_string(&input.path)
        .await
        .map_err(|source| FileToolError::Read {
            path: input.path.clone(),
            source,
        })?;

    tracing::debug!(path = %input.path, bytes = content.len(), "Read file");
    Ok(content)
}
