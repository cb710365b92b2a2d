//! CLI-specific output implementations
//!
//! Renders agent run events for the terminal.

pub mod cli_handler;
pub mod formatters;

pub use cli_handler::{CliOutputConfig, CliOutputHandler};
