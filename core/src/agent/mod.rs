//! Agent core logic and execution engine

pub mod base;
pub mod config;
pub mod core;
pub mod decision;
pub mod execution;
pub mod prompt;
pub mod scratchpad;

pub use base::{Agent, AgentResult};
pub use config::{AgentBuilder, AgentConfig, DEFAULT_MAX_ITERATIONS};
pub use core::AgentCore;
pub use decision::{tool_input_from_arguments, Decider, Decision, LlmDecider};
pub use execution::{AgentExecution, RunOutcome, ITERATION_LIMIT_NOTICE, MODEL_FAILURE_APOLOGY};
pub use prompt::{assemble_prompt, render_instructions, DEFAULT_SYSTEM_PROMPT};
pub use scratchpad::{InvocationOutcome, RunState, ToolInvocation};
