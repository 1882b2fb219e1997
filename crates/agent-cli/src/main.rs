//! fs-agent
//!
//! Terminal chat with an LLM that can list, read and edit local files.
//! Conversation goes to stdout, logs go to stderr (`RUST_LOG`, default `warn`).

mod cli;
mod stdin;

use std::sync::Arc;

use agent_core::{AgentBuilder, ScriptedInput};
use agent_runtime::{OpenRouterConfig, OpenRouterProvider};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Args;
use crate::stdin::StdinInput;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment first so RUST_LOG and clap env defaults see `.env`
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    // Any failure reaching here ends the session; exit status stays 0
    if let Err(e) = run(args).await {
        println!("Error: {e}");
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = OpenRouterConfig::from_env()?;
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    let provider = Arc::new(OpenRouterProvider::from_config(config)?);
    let base_url = provider.config().base_url.clone();

    let mut builder = AgentBuilder::new()
        .provider(provider)
        .tools(file_tools::registry()?)
        .model(args.model)
        .max_tokens(args.max_tokens);
    if let Some(prompt) = args.system_prompt {
        builder = builder.system_prompt(prompt);
    }
    let agent = builder.build()?;

    tracing::info!(
        tools = ?agent.tools().names(),
        model = %agent.config().generation.model,
        base_url = %base_url,
        "Starting session"
    );

    let mut stdout = std::io::stdout();
    let conversation = if args.prompts.is_empty() {
        agent.run(&mut StdinInput::stdin(), &mut stdout).await?
    } else {
        agent.run(&mut ScriptedInput::new(args.prompts), &mut stdout).await?
    };

    tracing::info!(turns = conversation.len(), "Session ended");
    Ok(())
}
