//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
///
/// Everything here escapes the conversation loop. Tool failures never do;
/// they are reported back to the model as [`ToolError`] values instead.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Parse error (e.g., malformed provider response)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Two tools were registered under the same name
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Other(err.to_string())
    }
}

/// Failure of a single tool invocation.
///
/// The `Display` output is exactly what the model sees as the tool result.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Arguments decoded but failed validation
    #[error("invalid input parameters")]
    InvalidInput,

    /// Arguments could not be decoded into the tool's input type
    #[error("invalid input parameters: {0}")]
    Decode(#[from] serde_json::Error),

    /// Filesystem or other IO failure
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Tool-specific failure
    #[error(transparent)]
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

impl ToolError {
    /// Wrap a tool-specific error
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ToolError::Failed(Box::new(err))
    }
}
