//! CLI command implementations

pub mod interactive;
pub mod run;
pub mod tools;

pub use interactive::interactive_command;
pub use run::run_command;
pub use tools::tools_command;

use crate::config::LoadedConfig;
use crate::output::{CliOutputConfig, CliOutputHandler};
use anyhow::{Context, Result};
use scout_core::output::{AgentOutput, NullOutput};
use scout_core::{Agent, AgentBuilder, AgentCore, TrajectoryRecorder};
use std::path::PathBuf;
use tracing::info;

/// Build the agent shared by the run and interactive commands
pub fn build_agent(
    loaded: LoadedConfig,
    verbose: bool,
    trajectory_file: Option<PathBuf>,
) -> Result<AgentCore> {
    info!("Using protocol: {}", loaded.llm.protocol.as_str());
    info!("Using model: {}", loaded.llm.model);

    let output: Box<dyn AgentOutput> = if verbose {
        Box::new(CliOutputHandler::new(CliOutputConfig { verbose }))
    } else {
        Box::new(NullOutput)
    };

    let mut agent = AgentBuilder::new(loaded.llm, loaded.tools)
        .with_agent_config(loaded.agent)
        .build_with_output(output)
        .context("Failed to build agent")?;

    if let Some(path) = trajectory_file {
        info!("Recording trajectory to {}", path.display());
        agent.set_trajectory_recorder(TrajectoryRecorder::with_file(path));
    }

    Ok(agent)
}
