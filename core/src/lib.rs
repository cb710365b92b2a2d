//! # Scout Core
//!
//! Core library for Scout, a conversational agent that answers questions by
//! calling web search, timezone and weather tools through a hosted chat model.
//!
//! The engine is a bounded decide/execute loop ([`AgentCore`]) with a rolling
//! conversation memory ([`memory::MemoryWindow`]). Configuration arrives fully
//! resolved; discovery and layering belong to the front end.

// Core modules
pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod output;
pub mod tools;
pub mod trajectory;

// Re-export commonly used types
pub use agent::{Agent, AgentBuilder, AgentConfig, AgentCore, AgentExecution, RunOutcome};
pub use config::{ModelParams, Protocol, ResolvedLlmConfig, ToolSettings};
pub use error::{Error, Result};
pub use trajectory::TrajectoryRecorder;

/// Current version of the scout-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
