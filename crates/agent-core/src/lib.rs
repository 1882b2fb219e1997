//! # agent-core
//!
//! Tool-calling conversation loop with a provider-agnostic LLM abstraction.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tool     │  │   LlmProvider       │  │
//! │  │    Loop     │──│  Registry   │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! │         │                                                    │
//! │  ┌─────────────┐                                             │
//! │  │Conversation │  append-only, replayed on every request     │
//! │  └─────────────┘                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop reads a line, asks the model, runs every tool the model called
//! and re-queries the model with the results until it answers in plain text.

pub mod provider;
pub mod tool;
pub mod schema;
pub mod reasoning;
pub mod message;
pub mod input;
pub mod error;

pub use error::{AgentError, Result, ToolError};
pub use input::{InputSource, ScriptedInput};
pub use message::{ContentBlock, Conversation, ConversationTurn, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use schema::{ParamType, ParameterSchema};
pub use tool::{Tool, ToolCall, ToolInvocationResult, ToolRegistry, ToolSchema};
