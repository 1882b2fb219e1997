//! # agent-runtime
//!
//! Runtime providers for the fs-agent loop.
//!
//! ## Providers
//!
//! - **OpenRouter** (default): any OpenAI-compatible chat-completions
//!   endpoint; point `base_url` at a local server to use it instead
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::OpenRouterProvider;
//!
//! let provider = OpenRouterProvider::from_env()?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .tools(file_tools::registry()?)
//!     .build()?;
//! ```

pub mod openrouter;

pub use openrouter::{OpenRouterConfig, OpenRouterProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentBuilder, AgentError, LlmProvider, Result, Role, Tool, ToolRegistry,
};
