//! Command-line Arguments

use agent_core::provider::DEFAULT_MODEL;
use clap::Parser;

/// Chat with an LLM that can list, read and edit files in the current directory
#[derive(Debug, Parser)]
#[command(name = "fs-agent", version)]
pub struct Args {
    /// Model identifier understood by the endpoint
    #[arg(long, env = "FS_AGENT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Maximum tokens per model reply
    #[arg(long, env = "FS_AGENT_MAX_TOKENS", default_value_t = 1024)]
    pub max_tokens: u32,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPEN_ROUTER_BASE_URL")]
    pub base_url: Option<String>,

    /// System prompt sent ahead of the conversation
    #[arg(long, env = "FS_AGENT_SYSTEM_PROMPT")]
    pub system_prompt: Option<String>,

    /// Run these inputs in order instead of reading stdin, then exit
    #[arg(short = 'p', long = "prompt")]
    pub prompts: Vec<String>,
}
