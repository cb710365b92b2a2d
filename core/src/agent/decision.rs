//! Turning a prompt into a decision

use crate::error::{LlmError, Result};
use crate::llm::{ChatOptions, ContentBlock, LlmClient, LlmMessage, ToolDefinition};
use crate::tools::TOOL_INPUT_KEY;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// What the agent does next
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Invoke a tool with a single free-text input
    ToolCall {
        id: String,
        name: String,
        input: String,
        /// Text the model produced alongside the call, if any
        commentary: Option<String>,
    },

    /// Stop and reply to the user
    FinalAnswer(String),
}

/// Chooses the next step from the assembled prompt
#[async_trait]
pub trait Decider: Send + Sync {
    async fn decide(&self, messages: Vec<LlmMessage>, tools: &[ToolDefinition]) -> Result<Decision>;

    fn model_name(&self) -> &str {
        "unknown"
    }

    fn provider_name(&self) -> &str {
        "unknown"
    }
}

/// Decider backed by a chat completion model
pub struct LlmDecider {
    client: Arc<dyn LlmClient>,
    options: ChatOptions,
}

impl LlmDecider {
    pub fn new(client: Arc<dyn LlmClient>, options: ChatOptions) -> Self {
        Self { client, options }
    }
}

#[async_trait]
impl Decider for LlmDecider {
    async fn decide(
        &self,
        messages: Vec<LlmMessage>,
        tools: &[ToolDefinition],
    ) -> Result<Decision> {
        let response = self
            .client
            .chat_completion(messages, Some(tools.to_vec()), Some(self.options.clone()))
            .await?;

        if let Some(usage) = &response.usage {
            debug!(
                "Token usage: {} prompt + {} completion = {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let text = response.message.get_text().filter(|t| !t.trim().is_empty());
        let tool_uses = response.message.get_tool_uses();

        if tool_uses.len() > 1 {
            warn!(
                "Model requested {} tool calls, only the first will run",
                tool_uses.len()
            );
        }

        match tool_uses.first() {
            Some(ContentBlock::ToolUse { id, name, input }) => Ok(Decision::ToolCall {
                id: id.clone(),
                name: name.clone(),
                input: tool_input_from_arguments(input),
                commentary: text,
            }),
            _ => match text {
                Some(answer) => Ok(Decision::FinalAnswer(answer)),
                None => Err(LlmError::EmptyResponse {
                    message: "Model returned neither text nor a tool call".to_string(),
                }
                .into()),
            },
        }
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }

    fn provider_name(&self) -> &str {
        self.client.provider_name()
    }
}

/// Extract the single string argument from a tool call's arguments.
///
/// Accepts `{"input": "..."}`, a bare string (arguments that were not JSON),
/// or an object with exactly one string field. Anything else is passed on as
/// its JSON text.
pub fn tool_input_from_arguments(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        Value::Object(map) => match map.get(TOOL_INPUT_KEY) {
            Some(Value::String(input)) => input.clone(),
            Some(other) => other.to_string(),
            None if map.len() == 1 => match map.values().next() {
                Some(Value::String(only)) => only.clone(),
                _ => arguments.to_string(),
            },
            None => arguments.to_string(),
        },
        other => other.to_string(),
    }
}
