//! Conversation memory shared across runs of one session

pub mod window;

pub use window::{MemoryWindow, Turn, TurnRole, DEFAULT_MEMORY_WINDOW};
