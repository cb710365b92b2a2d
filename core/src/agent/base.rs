//! Base agent trait and structures

use super::config::AgentConfig;
use crate::error::Result;
use crate::memory::MemoryWindow;
use crate::trajectory::TrajectoryRecorder;
use async_trait::async_trait;

use super::execution::AgentExecution;

/// Result type for agent operations
pub type AgentResult<T> = Result<T>;

/// Base trait for all agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Answer one question. A failed model call is reported in the returned
    /// execution, not as `Err`.
    async fn ask(&mut self, question: &str) -> AgentResult<AgentExecution>;

    /// Get the agent's configuration
    fn config(&self) -> &AgentConfig;

    /// Get the agent's name/type
    fn agent_type(&self) -> &str;

    /// Conversation memory carried between questions
    fn memory(&self) -> &MemoryWindow;

    /// Forget the conversation so far
    fn clear_memory(&mut self);

    /// Set the trajectory recorder
    fn set_trajectory_recorder(&mut self, recorder: TrajectoryRecorder);

    /// Get the trajectory recorder
    fn trajectory_recorder(&self) -> Option<&TrajectoryRecorder>;
}
