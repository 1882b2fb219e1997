//! Tool System
//!
//! Tools are registered once at startup and invoked by the agent loop.
//! Dispatch never fails: unknown names, handler errors and handler panics
//! all come back as an error-flagged [`ToolInvocationResult`].

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::error::{AgentError, Result, ToolError};
use crate::message::ContentBlock;
use crate::schema::{object_schema, ParameterSchema};

/// Result content for a call naming no registered tool
pub const TOOL_NOT_FOUND: &str = "tool not found";

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID, echoed back in the result
    pub id: String,

    /// Tool identifier
    pub name: String,

    /// Arguments exactly as the model sent them
    pub input: serde_json::Value,
}

impl ToolCall {
    /// Extract the call from a `ToolUse` block
    pub fn from_block(block: &ContentBlock) -> Option<Self> {
        match block {
            ContentBlock::ToolUse { id, name, input } => Some(Self {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
            _ => None,
        }
    }
}

/// Normalized outcome of any tool invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocationResult {
    /// Output (success payload or error message)
    pub content: String,

    /// Whether the invocation failed
    pub is_error: bool,
}

impl ToolInvocationResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }

    /// Turn into the `ToolResult` block answering `tool_use_id`
    pub fn into_block(self, tool_use_id: impl Into<String>) -> ContentBlock {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: self.content,
            is_error: self.is_error,
        }
    }
}

impl From<std::result::Result<String, ToolError>> for ToolInvocationResult {
    fn from(outcome: std::result::Result<String, ToolError>) -> Self {
        match outcome {
            Ok(content) => Self::success(content),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSchema {
    /// JSON-Schema object describing the tool's arguments
    pub fn input_schema(&self) -> serde_json::Value {
        object_schema(&self.parameters)
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Run the tool on the model's raw arguments.
    ///
    /// Implementations decode `input` into their own parameter type and
    /// report every failure through `Err`.
    async fn execute(&self, input: &serde_json::Value) -> std::result::Result<String, ToolError>;
}

/// Read-only registry of available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build the registry. Names must be unique.
    pub fn from_tools<I>(tools: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut registry = Self::default();

        for tool in tools {
            let name = tool.schema().name;
            if registry.index.contains_key(&name) {
                return Err(AgentError::DuplicateTool(name));
            }
            registry.index.insert(name, registry.tools.len());
            registry.tools.push(tool);
        }

        Ok(registry)
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| self.tools[i].clone())
    }

    /// All tool schemas, in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Tool names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.schema().name).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve and run one call. Never fails.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolInvocationResult {
        let Some(tool) = self.get(&call.name) else {
            tracing::warn!(tool = %call.name, id = %call.id, "Tool not found");
            return ToolInvocationResult::error(TOOL_NOT_FOUND);
        };

        tracing::debug!(tool = %call.name, id = %call.id, "Executing tool");

        match AssertUnwindSafe(tool.execute(&call.input)).catch_unwind().await {
            Ok(outcome) => {
                let result = ToolInvocationResult::from(outcome);
                if result.is_error {
                    tracing::debug!(tool = %call.name, error = %result.content, "Tool failed");
                }
                result
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                tracing::error!(tool = %call.name, %reason, "Tool panicked");
                ToolInvocationResult::error(format!("tool panicked: {reason}"))
            }
        }
    }
}
