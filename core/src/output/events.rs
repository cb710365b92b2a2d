//! Run events and the output trait

use crate::agent::RunOutcome;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result type for output handlers
pub type OutputResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Status of a tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolExecutionStatus {
    Executing,
    Success,
    Error,
}

/// Snapshot of a tool invocation for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocationInfo {
    /// Id of the tool call
    pub execution_id: String,
    pub tool_name: String,
    /// The free-text argument passed to the tool
    pub input: String,
    /// 1-based round-trip number within the run
    pub iteration: usize,
    pub status: ToolExecutionStatus,
    /// Tool output, set once the invocation completes
    pub output: Option<String>,
    pub duration_ms: Option<u64>,
}

impl ToolInvocationInfo {
    pub fn started(
        execution_id: impl Into<String>,
        tool_name: impl Into<String>,
        input: impl Into<String>,
        iteration: usize,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            tool_name: tool_name.into(),
            input: input.into(),
            iteration,
            status: ToolExecutionStatus::Executing,
            output: None,
            duration_ms: None,
        }
    }

    /// Mark the invocation finished with the given output
    pub fn completed(
        mut self,
        success: bool,
        output: impl Into<String>,
        duration_ms: Option<u64>,
    ) -> Self {
        self.status = if success {
            ToolExecutionStatus::Success
        } else {
            ToolExecutionStatus::Error
        };
        self.output = Some(output.into());
        self.duration_ms = duration_ms;
        self
    }
}

/// Events emitted during a run
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// A question was accepted and the loop is starting
    RunStarted { input: String, max_iterations: usize },

    /// Text the model produced alongside a tool call
    ModelCommentary { iteration: usize, text: String },

    ToolInvocationStarted { invocation: ToolInvocationInfo },

    ToolInvocationCompleted { invocation: ToolInvocationInfo },

    /// The run reached a terminal state
    RunCompleted {
        outcome: RunOutcome,
        iterations: usize,
        duration: Duration,
    },
}

/// Receiver of run events
#[async_trait]
pub trait AgentOutput: Send + Sync {
    /// Handle a single event
    async fn emit_event(&self, event: AgentEvent) -> OutputResult;
}

/// Output that discards every event
pub struct NullOutput;

#[async_trait]
impl AgentOutput for NullOutput {
    async fn emit_event(&self, _event: AgentEvent) -> OutputResult {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_sets_status_and_output() {
        let info = ToolInvocationInfo::started("c1", "check_time", "Asia/Tokyo", 1);
        assert_eq!(info.status, ToolExecutionStatus::Executing);
        assert!(info.output.is_none());

        let done = info.clone().completed(true, "2024-01-15 21:00:00 JST+0900", Some(3));
        assert_eq!(done.status, ToolExecutionStatus::Success);
        assert_eq!(done.output.as_deref(), Some("2024-01-15 21:00:00 JST+0900"));

        let failed = info.completed(
            false,
            "Unknown timezone. Please provide a valid timezone.",
            None,
        );
        assert_eq!(failed.status, ToolExecutionStatus::Error);
    }

    #[tokio::test]
    async fn test_null_output_accepts_events() {
        let output = NullOutput;
        assert!(output
            .emit_event(AgentEvent::ModelCommentary {
                iteration: 1,
                text: "Checking the clock".to_string(),
            })
            .await
            .is_ok());
    }
}
