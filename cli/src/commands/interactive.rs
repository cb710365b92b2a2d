//! Interactive mode command

use crate::interactive::{run_session, EditorLineSource};
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

/// Start the chat loop
pub async fn interactive_command(
    config_loader: crate::config::CliConfigLoader,
    trajectory_file: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let loaded = config_loader.load().await?;
    if let Some(source) = &loaded.source {
        debug!("Config loaded from {}", source.display());
    }

    let mut agent = super::build_agent(loaded, verbose, trajectory_file)?;
    let mut lines = EditorLineSource::new()?;
    let mut stdout = std::io::stdout();

    run_session(&mut agent, &mut lines, &mut stdout).await
}
