//! Configuration discovery and layering for the CLI

pub mod loader;

pub use loader::{CliConfigLoader, CliOverrides, LoadedConfig};
