//! Interactive chat session

pub mod repl;

pub use repl::{run_session, EditorLineSource};
