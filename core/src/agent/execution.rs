//! Agent execution result structures

use super::scratchpad::ToolInvocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Notice returned when a run hits the iteration cap
pub const ITERATION_LIMIT_NOTICE: &str = "Agent stopped due to iteration limit.";

/// Reply shown when the model call fails
pub const MODEL_FAILURE_APOLOGY: &str =
    "Sorry, I couldn't reach the language model to answer that. Please try again.";

/// How a run terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// The model gave a final answer
    Answered,
    /// The iteration cap was reached
    Capped,
    /// The model call failed
    Failed,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Answered => "answered",
            RunOutcome::Capped => "capped",
            RunOutcome::Failed => "failed",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentExecution {
    pub outcome: RunOutcome,

    /// Text for the user
    pub answer: String,

    /// Tool round-trips performed
    pub iterations: usize,

    /// Total execution time in milliseconds
    pub duration_ms: u64,

    /// Every tool invocation of the run, in order
    pub invocations: Vec<ToolInvocation>,
}

impl AgentExecution {
    pub fn answered(answer: String, invocations: Vec<ToolInvocation>, duration_ms: u64) -> Self {
        Self {
            outcome: RunOutcome::Answered,
            answer,
            iterations: invocations.len(),
            duration_ms,
            invocations,
        }
    }

    /// Capped run. The answer is the limit notice plus the last commentary.
    pub fn capped(
        last_commentary: Option<&str>,
        invocations: Vec<ToolInvocation>,
        duration_ms: u64,
    ) -> Self {
        let answer = match last_commentary {
            Some(commentary) => format!("{}\n{}", ITERATION_LIMIT_NOTICE, commentary),
            None => ITERATION_LIMIT_NOTICE.to_string(),
        };
        Self {
            outcome: RunOutcome::Capped,
            answer,
            iterations: invocations.len(),
            duration_ms,
            invocations,
        }
    }

    pub fn failed(invocations: Vec<ToolInvocation>, duration_ms: u64) -> Self {
        Self {
            outcome: RunOutcome::Failed,
            answer: MODEL_FAILURE_APOLOGY.to_string(),
            iterations: invocations.len(),
            duration_ms,
            invocations,
        }
    }

    /// Whether the run updates conversation memory
    pub fn is_remembered(&self) -> bool {
        self.outcome != RunOutcome::Failed
    }
}
