//! Single question command

use anyhow::Result;
use scout_core::Agent;
use std::path::PathBuf;
use tracing::info;

/// Answer one question and print the answer
pub async fn run_command(
    question: String,
    config_loader: crate::config::CliConfigLoader,
    trajectory_file: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let loaded = config_loader.load().await?;
    let mut agent = super::build_agent(loaded, verbose, trajectory_file)?;

    info!("Asking: {}", question);
    let execution = agent.ask(&question).await?;
    println!("{}", execution.answer);

    Ok(())
}
