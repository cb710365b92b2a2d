//! # scout CLI
//!
//! Command-line interface for Scout, a terminal assistant that answers
//! questions with web search, timezone and weather tools.
//!
//! ## Usage
//!
//! - `scout` - Start an interactive chat
//! - `scout "question"` - Answer a single question
//! - `scout tools` - Show available tools

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod interactive;
mod output;

use commands::{interactive_command, run_command, tools_command};
use config::{CliConfigLoader, CliOverrides};

/// scout - ask questions, get answers backed by search, time and weather tools
#[derive(Parser)]
#[command(name = "scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A terminal assistant that answers questions with web search, time and weather tools")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Protocol to use (azure_openai, openai_compat)
    #[arg(long)]
    protocol: Option<String>,

    /// Azure resource endpoint or OpenAI-compatible base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// API key override
    #[arg(long)]
    api_key: Option<String>,

    /// Azure OpenAI API version
    #[arg(long)]
    api_version: Option<String>,

    /// Azure deployment id or model name
    #[arg(long)]
    deployment: Option<String>,

    /// weatherapi.com key
    #[arg(long)]
    weather_api_key: Option<String>,

    /// Bing Web Search subscription key
    #[arg(long)]
    search_key: Option<String>,

    /// Maximum tool calls per question
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Conversation turns kept in memory
    #[arg(long)]
    memory_window: Option<usize>,

    /// Output trajectory file
    #[arg(long)]
    trajectory_file: Option<PathBuf>,

    /// Show tool calls and model commentary
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    debug_output: bool,

    /// The question to answer (if provided, answers once and exits)
    question: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show available tools
    Tools,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new().with_overrides(CliOverrides {
        protocol: cli.protocol.clone(),
        endpoint: cli.endpoint.clone(),
        api_key: cli.api_key.clone(),
        api_version: cli.api_version.clone(),
        deployment: cli.deployment.clone(),
        weather_api_key: cli.weather_api_key.clone(),
        search_key: cli.search_key.clone(),
        max_iterations: cli.max_iterations,
        memory_window: cli.memory_window,
    });

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over the flags
    let filter = if cli.verbose || cli.debug_output {
        "debug"
    } else {
        "info"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_loader = build_config_loader(&cli);

    match (cli.question, cli.command) {
        (Some(question), None) => {
            run_command(question, config_loader, cli.trajectory_file, cli.verbose).await
        }
        (Some(_), Some(_)) => {
            tracing::error!("Error: Cannot specify both a question and a subcommand");
            std::process::exit(1);
        }
        (None, Some(Commands::Tools)) => tools_command().await,
        (None, None) => interactive_command(config_loader, cli.trajectory_file, cli.verbose).await,
    }
}
