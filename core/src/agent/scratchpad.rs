//! Per-run state: the scratchpad of tool invocations

use crate::tools::ToolResult;
use serde::{Deserialize, Serialize};

/// Whether a tool invocation produced a usable result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationOutcome {
    Success,
    Failure,
}

/// One tool round-trip, fed back to the model for the rest of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Tool call id assigned by the model
    pub id: String,
    pub tool_name: String,
    pub input_query: String,
    pub output: String,
    pub outcome: InvocationOutcome,
}

impl ToolInvocation {
    pub fn from_result(tool_name: &str, input_query: &str, result: &ToolResult) -> Self {
        Self {
            id: result.tool_call_id.clone(),
            tool_name: tool_name.to_string(),
            input_query: input_query.to_string(),
            output: result.content.clone(),
            outcome: if result.success {
                InvocationOutcome::Success
            } else {
                InvocationOutcome::Failure
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == InvocationOutcome::Success
    }
}

/// State of one in-flight run. Dropped when the run terminates.
#[derive(Debug, Clone)]
pub struct RunState {
    original_input: String,
    scratchpad: Vec<ToolInvocation>,
    iteration_count: usize,
    last_commentary: Option<String>,
}

impl RunState {
    pub fn new(original_input: impl Into<String>) -> Self {
        Self {
            original_input: original_input.into(),
            scratchpad: Vec::new(),
            iteration_count: 0,
            last_commentary: None,
        }
    }

    pub fn original_input(&self) -> &str {
        &self.original_input
    }

    pub fn scratchpad(&self) -> &[ToolInvocation] {
        &self.scratchpad
    }

    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    /// Most recent non-empty text the model produced with a tool call
    pub fn last_commentary(&self) -> Option<&str> {
        self.last_commentary.as_deref()
    }

    /// Append a completed round-trip and advance the iteration count
    pub fn push(&mut self, invocation: ToolInvocation) {
        self.scratchpad.push(invocation);
        self.iteration_count += 1;
    }

    pub fn note_commentary(&mut self, commentary: Option<&str>) {
        if let Some(text) = commentary.map(str::trim).filter(|t| !t.is_empty()) {
            self.last_commentary = Some(text.to_string());
        }
    }

    pub fn into_scratchpad(self) -> Vec<ToolInvocation> {
        self.scratchpad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_advances_iterations() {
        let mut state = RunState::new("What is the weather in Oslo?");
        assert_eq!(state.iteration_count(), 0);

        let result = ToolResult::failure("c1", "Failed to get weather data.");
        state.push(ToolInvocation::from_result("check_weather", "Oslo", &result));

        assert_eq!(state.iteration_count(), 1);
        assert_eq!(state.scratchpad()[0].outcome, InvocationOutcome::Failure);
        assert_eq!(state.scratchpad()[0].id, "c1");
        assert_eq!(state.original_input(), "What is the weather in Oslo?");
    }

    #[test]
    fn test_blank_commentary_keeps_previous() {
        let mut state = RunState::new("q");
        state.note_commentary(Some("Looking it up"));
        state.note_commentary(Some("   "));
        state.note_commentary(None);
        assert_eq!(state.last_commentary(), Some("Looking it up"));
    }
}
