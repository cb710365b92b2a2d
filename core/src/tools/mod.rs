//! Tool system and built-in tools

pub mod base;
pub mod builtin;
pub mod registry;

pub use base::{Tool, ToolCall, ToolExample, ToolExecutor, ToolResult, TOOL_INPUT_KEY};
pub use registry::{ToolFactory, ToolRegistry, BUILTIN_TOOLS};
