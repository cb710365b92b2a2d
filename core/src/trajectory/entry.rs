//! Trajectory entry types

use crate::llm::LlmMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timestamped event in a run transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryEntry {
    pub timestamp: DateTime<Utc>,

    /// Tool round-trip number the entry belongs to (0 before the first)
    pub iteration: usize,

    #[serde(flatten)]
    pub entry_type: EntryType,
}

/// What happened
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryType {
    RunStart {
        input: String,
        config: serde_json::Value,
    },

    /// Prompt sent to the model
    ModelRequest {
        messages: Vec<LlmMessage>,
        model: String,
        provider: String,
    },

    /// What the decider chose
    Decision {
        /// `tool_call` or `final_answer`
        kind: String,
        tool_name: Option<String>,
        input: Option<String>,
        text: Option<String>,
    },

    ToolInvocation {
        id: String,
        tool_name: String,
        input: String,
        output: String,
        success: bool,
    },

    RunComplete {
        outcome: String,
        answer: String,
        iterations: usize,
        duration_ms: u64,
    },

    Error {
        message: String,
        context: Option<String>,
    },
}

impl TrajectoryEntry {
    fn new(entry_type: EntryType, iteration: usize) -> Self {
        Self {
            timestamp: Utc::now(),
            iteration,
            entry_type,
        }
    }

    pub fn run_start(input: String, config: serde_json::Value) -> Self {
        Self::new(EntryType::RunStart { input, config }, 0)
    }

    pub fn model_request(
        messages: Vec<LlmMessage>,
        model: String,
        provider: String,
        iteration: usize,
    ) -> Self {
        Self::new(
            EntryType::ModelRequest {
                messages,
                model,
                provider,
            },
            iteration,
        )
    }

    pub fn tool_call_decision(
        tool_name: String,
        input: String,
        commentary: Option<String>,
        iteration: usize,
    ) -> Self {
        Self::new(
            EntryType::Decision {
                kind: "tool_call".to_string(),
                tool_name: Some(tool_name),
                input: Some(input),
                text: commentary,
            },
            iteration,
        )
    }

    pub fn final_answer_decision(text: String, iteration: usize) -> Self {
        Self::new(
            EntryType::Decision {
                kind: "final_answer".to_string(),
                tool_name: None,
                input: None,
                text: Some(text),
            },
            iteration,
        )
    }

    pub fn tool_invocation(
        id: String,
        tool_name: String,
        input: String,
        output: String,
        success: bool,
        iteration: usize,
    ) -> Self {
        Self::new(
            EntryType::ToolInvocation {
                id,
                tool_name,
                input,
                output,
                success,
            },
            iteration,
        )
    }

    pub fn run_complete(
        outcome: String,
        answer: String,
        iterations: usize,
        duration_ms: u64,
    ) -> Self {
        Self::new(
            EntryType::RunComplete {
                outcome,
                answer,
                iterations,
                duration_ms,
            },
            iterations,
        )
    }

    pub fn error(message: String, context: Option<String>, iteration: usize) -> Self {
        Self::new(EntryType::Error { message, context }, iteration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_flat_with_type_tag() {
        let entry = TrajectoryEntry::tool_invocation(
            "call_1".to_string(),
            "check_time".to_string(),
            "Asia/Tokyo".to_string(),
            "2024-01-15 21:00:00 JST+0900".to_string(),
            true,
            1,
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "tool_invocation");
        assert_eq!(value["iteration"], 1);
        assert_eq!(value["tool_name"], "check_time");
        assert!(value.get("timestamp").is_some());

        let back: TrajectoryEntry = serde_json::from_value(value).unwrap();
        assert!(matches!(back.entry_type, EntryType::ToolInvocation { success: true, .. }));
    }
}
