pub mod cli;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod logging;
pub mod model;
pub mod proxy;
pub mod repl;

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::Path;
use tracing::info;

use cli::{Cli, Command};
use client::CompletionClient;
use config::Config;
use conversation::Conversation;
use repl::run_repl;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init();

    let cfg = Config::resolve(&cli.overrides())?;
    let proxy = cfg
        .proxy
        .as_ref()
        .map_or_else(|| "none".to_string(), ToString::to_string);
    info!(
        model = %cfg.params.model,
        api_url = %cfg.api_url,
        max_tokens = cfg.params.max_tokens,
        temperature = cfg.params.temperature,
        timeout_secs = cfg.timeout_secs,
        proxy = %proxy,
        "loaded runtime configuration"
    );

    let client = CompletionClient::new(&cfg)?;
    let mut conversation = Conversation::new(&client, &cfg.params);

    match &cli.command {
        Command::Complete { source } => {
            let prompt = read_prompt(source)?;
            let answer = conversation.exchange(&prompt).await?;
            println!("{answer}");
            Ok(())
        }
        Command::Repl => run_repl(&mut conversation).await,
    }
}

fn read_prompt(source: &Path) -> Result<String> {
    if source == Path::new("-") {
        return io::read_to_string(io::stdin()).context("Failed to read prompt from stdin");
    }
    std::fs::read_to_string(source)
        .with_context(|| format!("Failed to read prompt from '{}'", source.display()))
}
