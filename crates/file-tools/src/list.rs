//! List Files Tool
//!
//! Recursive directory listing relative to the requested root.

use std::path::Path;

use agent_core::{ParameterSchema, ToolError, ToolSchema};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::FileToolError;

pub const NAME: &str = "list_files";

#[derive(Debug, Default, Deserialize)]
pub struct ListFilesInput {
    /// Directory to list; current directory when absent
    #[serde(default)]
    pub path: Option<String>,
}

pub fn schema() -> ToolSchema {
    ToolSchema {
        name: NAME.into(),
        description: "List files and directories at a given path. If no path is provided, \
                      lists files in the current directory. Directories end with '/'."
            .into(),
        parameters: vec![ParameterSchema::optional(
            "path",
            "Optional relative path to list files from. Defaults to current directory if not provided.",
        )],
    }
}

pub async fn list_files(input: &serde_json::Value) -> Result<String, ToolError> {
    let input: ListFilesInput = if input.is_null() {
        ListFilesInput::default()
    } else {
        serde_json::from_value(input.clone())?
    };

    let root = input
        .path
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".into());

    let entries = walk(&root).await?;
    tracing::debug!(root = %root, entries = entries.len(), "Listed directory");

    Ok(serde_json::Value::from(entries).to_string())
}

/// Every entry below `root` (root excluded), `/`-separated, dirs suffixed with `/`
async fn walk(root: &str) -> Result<Vec<String>, FileToolError> {
    let meta = match tokio::fs::metadata(root).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FileToolError::DirectoryNotFound(root.into()));
        }
        Err(e) => {
            return Err(FileToolError::Read {
                path: root.into(),
                source: e,
            });
        }
    };
    if !meta.is_dir() {
        return Err(FileToolError::NotADirectory(root.into()));
    }

    let base = Path::new(root);
    let mut entries = Vec::new();

    for entry in WalkDir::new(base).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| FileToolError::Walk {
            path: root.into(),
            source,
        })?;

        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        let mut name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            name.push('/');
        }
        entries.push(name);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("b.txt"), "b").unwrap();
        dir
    }

    fn as_set(output: &str) -> HashSet<String> {
        serde_json::from_str::<Vec<String>>(output).unwrap().into_iter().collect()
    }

    #[tokio::test]
    async fn test_lists_recursively() {
        let dir = fixture();
        let root = dir.path().to_string_lossy().to_string();

        let output = list_files(&json!({ "path": root })).await.unwrap();
        let expected: HashSet<String> = ["a.txt", "sub/", "sub/b.txt"]
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(as_set(&output), expected);
    }

    #[tokio::test]
    async fn test_root_is_excluded() {
        let dir = fixture();
        let root = dir.path().to_string_lossy().to_string();

        let entries = as_set(&list_files(&json!({ "path": root })).await.unwrap());
        assert!(!entries.contains(""));
        assert!(!entries.contains("/"));
        assert!(!entries.contains(&root));
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = list_files(&json!({ "path": dir.path() })).await.unwrap();
        assert_eq!(output, "[]");
    }

    #[tokio::test]
    async fn test_default_path_is_current_dir() {
        // cargo runs tests from the crate root, which always has a manifest
        let entries = as_set(&list_files(&json!({})).await.unwrap());
        assert!(entries.contains("Cargo.toml"));

        let null_entries = as_set(&list_files(&serde_json::Value::Null).await.unwrap());
        assert_eq!(entries, null_entries);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = list_files(&json!({ "path": missing })).await.unwrap_err();
        assert!(err.to_string().starts_with("directory not found"));
    }

    #[tokio::test]
    async fn test_file_is_not_a_directory() {
        let dir = fixture();
        let file = dir.path().join("a.txt");

        let err = list_files(&json!({ "path": file })).await.unwrap_err();
        assert!(err.to_string().starts_with("not a directory"));
    }

    #[tokio::test]
    async fn test_wrong_argument_type() {
        let err = list_files(&json!({ "path": 42 })).await.unwrap_err();
        assert!(matches!(err, ToolError::Decode(_)));
    }
}
