//! OpenAI and Azure OpenAI client implementation using async-openai library

use crate::config::{Protocol, ResolvedLlmConfig};
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, FinishReason, LlmClient, LlmMessage, LlmResponse, MessageContent,
    MessageRole, ToolDefinition, Usage,
};
use async_openai::{
    config::{AzureConfig, Config, OpenAIConfig},
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessage,
        ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse, FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Chat client for any async-openai backend configuration
pub struct OpenAiClient<C: Config = OpenAIConfig> {
    client: Client<C>,
    model: String,
    provider: &'static str,
}

/// Client bound to an Azure OpenAI deployment
pub type AzureOpenAiClient = OpenAiClient<AzureConfig>;

impl OpenAiClient<OpenAIConfig> {
    /// Create a new OpenAI-compatible client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key found for OpenAI".to_string(),
            }
            .into());
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            provider: "openai",
        })
    }
}

impl OpenAiClient<AzureConfig> {
    /// Create a new Azure OpenAI client. The deployment id is taken from
    /// `config.model`.
    pub fn azure(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key found for Azure OpenAI".to_string(),
            }
            .into());
        }

        let azure_config = AzureConfig::new()
            .with_api_base(&config.base_url)
            .with_api_key(&config.api_key)
            .with_deployment_id(&config.model)
            .with_api_version(config.api_version_or_default());

        Ok(Self {
            client: Client::with_config(azure_config),
            model: config.model.clone(),
            provider: "azure_openai",
        })
    }
}

/// Build the client matching the configured protocol
pub fn client_for_config(config: &ResolvedLlmConfig) -> Result<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match config.protocol {
        Protocol::AzureOpenAI => Arc::new(OpenAiClient::azure(config)?),
        Protocol::OpenAICompat => Arc::new(OpenAiClient::new(config)?),
    };
    Ok(client)
}

/// Convert our internal message format to async-openai format
fn convert_messages(messages: Vec<LlmMessage>) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut converted = Vec::new();

    for message in messages {
        match message.role {
            MessageRole::System => {
                let content = extract_text_content(&message.content);
                converted.push(ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage {
                        content: content.into(),
                        name: None,
                    },
                ));
            }
            MessageRole::User => {
                let content = extract_text_content(&message.content);
                converted.push(ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage {
                        content: content.into(),
                        name: None,
                    },
                ));
            }
            MessageRole::Assistant => {
                let mut content = String::new();
                let mut tool_calls = Vec::new();

                match &message.content {
                    MessageContent::Text(text) => content.push_str(text),
                    MessageContent::Blocks(blocks) => {
                        for block in blocks {
                            match block {
                                ContentBlock::Text { text } => {
                                    if !content.is_empty() {
                                        content.push('\n');
                                    }
                                    content.push_str(text);
                                }
                                ContentBlock::ToolUse { id, name, input } => {
                                    tool_calls.push(ChatCompletionMessageToolCall {
                                        id: id.clone(),
                                        r#type: ChatCompletionToolType::Function,
                                        function: async_openai::types::FunctionCall {
                                            name: name.clone(),
                                            arguments: input.to_string(),
                                        },
                                    });
                                }
                                ContentBlock::ToolResult { .. } => {}
                            }
                        }
                    }
                }

                converted.push(ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessage {
                        content: if content.is_empty() {
                            None
                        } else {
                            Some(ChatCompletionRequestAssistantMessageContent::Text(content))
                        },
                        name: None,
                        tool_calls: if tool_calls.is_empty() {
                            None
                        } else {
                            Some(tool_calls)
                        },
                        audio: None,
                        refusal: None,
                        ..Default::default()
                    },
                ));
            }
            MessageRole::Tool => {
                let mut pushed_any = false;
                if let MessageContent::Blocks(blocks) = &message.content {
                    for block in blocks {
                        if let ContentBlock::ToolResult {
                            tool_use_id,
                            content,
                            ..
                        } = block
                        {
                            converted.push(ChatCompletionRequestMessage::Tool(
                                ChatCompletionRequestToolMessage {
                                    content: ChatCompletionRequestToolMessageContent::Text(
                                        content.clone(),
                                    ),
                                    tool_call_id: tool_use_id.clone(),
                                },
                            ));
                            pushed_any = true;
                        }
                    }
                }
                if !pushed_any {
                    return Err(LlmError::InvalidRequest {
                        message: "Tool message must contain ToolResult".to_string(),
                    }
                    .into());
                }
            }
        }
    }

    Ok(converted)
}

/// Extract text content from MessageContent
fn extract_text_content(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Convert our tool definitions to async-openai format
fn convert_tools(tools: Vec<ToolDefinition>) -> Vec<ChatCompletionTool> {
    tools
        .into_iter()
        .map(|tool| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: tool.function.name,
                description: Some(tool.function.description),
                parameters: Some(tool.function.parameters),
                strict: None,
            },
        })
        .collect()
}

/// Convert async-openai response to our internal format
fn convert_response(response: CreateChatCompletionResponse) -> Result<LlmResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::EmptyResponse {
            message: "No choices in response".to_string(),
        })?;

    let mut blocks = Vec::new();
    if let Some(content) = choice.message.content {
        blocks.push(ContentBlock::Text { text: content });
    }

    for tool_call in choice.message.tool_calls.unwrap_or_default() {
        let function = tool_call.function;
        // Keep malformed arguments as a raw string rather than failing the turn
        let input: Value = serde_json::from_str(&function.arguments)
            .unwrap_or_else(|_| Value::String(function.arguments.clone()));

        blocks.push(ContentBlock::ToolUse {
            id: tool_call.id,
            name: function.name,
            input,
        });
    }

    let content = match blocks.as_slice() {
        [] => MessageContent::Text(String::new()),
        [ContentBlock::Text { text }] => MessageContent::Text(text.clone()),
        _ => MessageContent::Blocks(blocks),
    };

    let usage = response.usage.map(|u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    let finish_reason = choice.finish_reason.map(|reason| match reason {
        async_openai::types::FinishReason::Stop => FinishReason::Stop,
        async_openai::types::FinishReason::Length => FinishReason::Length,
        async_openai::types::FinishReason::ToolCalls => FinishReason::ToolCalls,
        async_openai::types::FinishReason::ContentFilter => FinishReason::ContentFilter,
        async_openai::types::FinishReason::FunctionCall => FinishReason::ToolCalls,
    });

    Ok(LlmResponse {
        message: LlmMessage {
            role: MessageRole::Assistant,
            content,
        },
        usage,
        model: response.model,
        finish_reason,
    })
}

#[async_trait]
impl<C: Config> LlmClient for OpenAiClient<C> {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let converted_messages = convert_messages(messages)?;
        let converted_tools = tools.map(convert_tools).filter(|t| !t.is_empty());

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model);
        request_builder.messages(converted_messages);

        let has_tools = converted_tools.is_some();
        if let Some(tools) = converted_tools {
            tracing::debug!("{} request with {} tools enabled", self.provider, tools.len());
            request_builder.tools(tools);
        }

        if let Some(opts) = options {
            if let Some(max_tokens) = opts.max_tokens {
                request_builder.max_tokens(max_tokens);
            }
            if let Some(temperature) = opts.temperature {
                request_builder.temperature(temperature);
            }
            if let Some(top_p) = opts.top_p {
                request_builder.top_p(top_p);
            }
            // The API rejects parallel_tool_calls without tools
            if let (true, Some(parallel)) = (has_tools, opts.parallel_tool_calls) {
                request_builder.parallel_tool_calls(parallel);
            }
        }

        let request = request_builder.build().map_err(|e| {
            tracing::error!("Failed to build {} request: {}", self.provider, e);
            LlmError::InvalidRequest {
                message: format!("Failed to build request: {}", e),
            }
        })?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            tracing::error!("{} API call failed: {}", self.provider, e);
            LlmError::ApiError {
                status: 500, // async-openai doesn't expose status codes directly
                message: e.to_string(),
            }
        })?;

        let response = convert_response(response)?;
        for block in response.message.get_tool_uses() {
            if let ContentBlock::ToolUse { id, name, .. } = block {
                tracing::debug!("Tool call: {} (id: {})", name, id);
            }
        }

        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_messages_with_tool_round_trip() {
        let messages = vec![
            LlmMessage::system("instructions"),
            LlmMessage::user("What time is it in Tokyo?"),
            LlmMessage::tool_use("call_1", "check_time", json!({"input": "Asia/Tokyo"})),
            LlmMessage::tool_result("call_1", "2024-01-15 21:00:00 JST+0900", false),
        ];

        let converted = convert_messages(messages).unwrap();
        assert_eq!(converted.len(), 4);
        assert!(matches!(converted[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(converted[1], ChatCompletionRequestMessage::User(_)));

        match &converted[2] {
            ChatCompletionRequestMessage::Assistant(assistant) => {
                assert!(assistant.content.is_none());
                let calls = assistant.tool_calls.as_ref().unwrap();
                assert_eq!(calls[0].id, "call_1");
                assert_eq!(calls[0].function.name, "check_time");
                assert_eq!(calls[0].function.arguments, r#"{"input":"Asia/Tokyo"}"#);
            }
            other => panic!("expected assistant message, got {:?}", other),
        }

        match &converted[3] {
            ChatCompletionRequestMessage::Tool(tool) => assert_eq!(tool.tool_call_id, "call_1"),
            other => panic!("expected tool message, got {:?}", other),
        }
    }

    #[test]
    fn test_tool_message_without_result_is_rejected() {
        let message = LlmMessage {
            role: MessageRole::Tool,
            content: MessageContent::Text("orphan".to_string()),
        };
        assert!(convert_messages(vec![message]).is_err());
    }

    #[test]
    fn test_convert_tools() {
        let tools = convert_tools(vec![ToolDefinition {
            tool_type: "function".to_string(),
            function: crate::llm::FunctionDefinition {
                name: "check_weather".to_string(),
                description: "Used to find weather information about a city".to_string(),
                parameters: json!({"type": "object"}),
            },
        }]);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function.name, "check_weather");
    }

    #[test]
    fn test_convert_response_with_tool_call() {
        let response: CreateChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "check_weather", "arguments": "{\"input\":\"Paris\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();

        let converted = convert_response(response).unwrap();
        assert_eq!(converted.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(converted.usage.unwrap().total_tokens, 15);
        let uses = converted.message.get_tool_uses();
        assert_eq!(uses.len(), 1);
        match uses[0] {
            ContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "check_weather");
                assert_eq!(input["input"], "Paris");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_convert_response_text_only() {
        let response: CreateChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-2",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello there"},
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let converted = convert_response(response).unwrap();
        assert_eq!(converted.message.content, MessageContent::Text("Hello there".to_string()));
        assert!(converted.usage.is_none());
    }
}
