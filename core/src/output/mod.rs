//! Output abstraction for agent run events
//!
//! The agent reports what it is doing through [`AgentOutput`]; front ends
//! decide how (or whether) to render it.

pub mod events;

pub use events::{
    AgentEvent, AgentOutput, NullOutput, OutputResult, ToolExecutionStatus, ToolInvocationInfo,
};
