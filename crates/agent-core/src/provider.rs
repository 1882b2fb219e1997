//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for LLM backends so the agent loop never
//! depends on a particular wire format.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = OpenRouterProvider::from_env()?;
//! let completion = provider.complete(conversation.turns(), &schemas, &options).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{ContentBlock, ConversationTurn};
use crate::tool::ToolSchema;

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "anthropic/claude-3.5-haiku")
    pub model: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature; provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Tool selection mode sent alongside tool definitions
    #[serde(default = "default_tool_choice")]
    pub tool_choice: String,

    /// System prompt, sent ahead of the conversation
    #[serde(default)]
    pub system_prompt: Option<String>,
}

pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-haiku";

fn default_max_tokens() -> u32 { 1024 }
fn default_tool_choice() -> String { "auto".into() }

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            max_tokens: default_max_tokens(),
            temperature: None,
            tool_choice: default_tool_choice(),
            system_prompt: None,
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// Ordered content blocks of the assistant message
    pub content: Vec<ContentBlock>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// The reply stopped at `max_tokens`; trailing text or tool arguments may be cut off
    pub fn is_truncated(&self) -> bool {
        self.finish_reason == Some(FinishReason::Length)
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Error,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// The agent works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs (e.g., "OpenRouter")
    fn name(&self) -> &str;

    /// Generate one assistant message from the full conversation.
    ///
    /// `tools` is sent on every request so the model can call any of them.
    async fn complete(
        &self,
        turns: &[ConversationTurn],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.max_tokens, 1024);
        assert_eq!(opts.model, "anthropic/claude-3.5-haiku");
        assert_eq!(opts.tool_choice, "auto");
        assert!(opts.temperature.is_none());
    }

    #[test]
    fn test_generation_options_serde_defaults() {
        let opts: GenerationOptions = serde_json::from_str(r#"{"model": "x"}"#).unwrap();
        assert_eq!(opts.model, "x");
        assert_eq!(opts.max_tokens, 1024);
        assert_eq!(opts.tool_choice, "auto");
    }

    #[test]
    fn test_truncated_only_on_length() {
        let mut completion = Completion {
            content: Vec::new(),
            model: "m".into(),
            usage: None,
            finish_reason: Some(FinishReason::Length),
        };
        assert!(completion.is_truncated());

        completion.finish_reason = Some(FinishReason::ToolUse);
        assert!(!completion.is_truncated());

        completion.finish_reason = None;
        assert!(!completion.is_truncated());
    }
}
