//! Base tool traits and structures

use crate::error::{Result, ToolError};
use crate::llm::{FunctionDefinition, ToolDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Name of the single string argument every tool accepts
pub const TOOL_INPUT_KEY: &str = "input";

/// Trait for all tools
///
/// Every tool takes exactly one free-text argument and returns text (or a
/// structured payload alongside its text rendering).
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Describe what the free-text input should contain
    fn input_description(&self) -> &str {
        "Input for the tool"
    }

    /// Get the JSON schema for the tool's parameters
    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                TOOL_INPUT_KEY: {
                    "type": "string",
                    "description": self.input_description()
                }
            },
            "required": [TOOL_INPUT_KEY]
        })
    }

    /// Execute the tool with the given input
    async fn execute(&self, call: ToolCall) -> Result<ToolResult>;

    /// Get examples of how to use this tool
    fn examples(&self) -> Vec<ToolExample> {
        Vec::new()
    }
}

/// A call to a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,

    /// Name of the tool to call
    pub name: String,

    /// The free-text argument
    pub input: String,
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is a result for
    pub tool_call_id: String,

    /// Whether the execution was successful
    pub success: bool,

    /// Result content, as the model will see it
    pub content: String,

    /// Optional structured data
    pub data: Option<serde_json::Value>,

    /// Execution duration in milliseconds
    pub duration_ms: Option<u64>,
}

/// Example usage of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExample {
    /// Description of what this example does
    pub description: String,

    /// Example input
    pub input: String,

    /// Expected result description
    pub expected_result: String,
}

impl ToolExample {
    pub fn new<S: Into<String>>(description: S, input: S, expected_result: S) -> Self {
        Self {
            description: description.into(),
            input: input.into(),
            expected_result: expected_result.into(),
        }
    }
}

/// Tool executor that manages tool execution
///
/// The same executor produces the model's tool definitions and runs the
/// calls, so the advertised set and the executable set never diverge.
pub struct ToolExecutor {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolCall {
    /// Create a new tool call with a fresh id
    pub fn new<S: Into<String>>(name: S, input: S) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            input: input.into(),
        }
    }

    /// Create a tool call carrying the id assigned by the model
    pub fn with_id<S: Into<String>>(id: S, name: S, input: S) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input: input.into(),
        }
    }
}

impl ToolResult {
    /// Create a successful result
    pub fn success<S: Into<String>>(tool_call_id: S, content: S) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: true,
            content: content.into(),
            data: None,
            duration_ms: None,
        }
    }

    /// Create a successful result from a structured payload. The content is
    /// the compact JSON serialization of `data`.
    pub fn structured<S: Into<String>>(tool_call_id: S, data: serde_json::Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: true,
            content: data.to_string(),
            data: Some(data),
            duration_ms: None,
        }
    }

    /// Create an error result, prefixed with `Error: `
    pub fn error<S: Into<String>>(tool_call_id: S, error: S) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: false,
            content: format!("Error: {}", error.into()),
            data: None,
            duration_ms: None,
        }
    }

    /// Create a failed result whose content is passed through verbatim
    pub fn failure<S: Into<String>>(tool_call_id: S, content: S) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: false,
            content: content.into(),
            data: None,
            duration_ms: None,
        }
    }

    /// Set execution duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

impl ToolExecutor {
    /// Create a new tool executor
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool
    pub fn register_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// List all available tools, sorted by name
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Iterate over the registered tools
    pub fn tools(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.values().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool call. An unregistered name is `ToolError::NotFound`;
    /// a tool that returns `Err` is folded into an error result.
    pub async fn execute(&self, call: ToolCall) -> std::result::Result<ToolResult, ToolError> {
        let tool = self
            .get_tool(&call.name)
            .ok_or_else(|| ToolError::NotFound {
                name: call.name.clone(),
            })?;

        let start_time = std::time::Instant::now();
        let call_id = call.id.clone();
        let result = tool.execute(call).await;
        let duration = start_time.elapsed().as_millis() as u64;

        match result {
            Ok(mut result) => {
                result.duration_ms = Some(duration);
                Ok(result)
            }
            Err(e) => Ok(ToolResult::error(call_id, e.to_string()).with_duration(duration)),
        }
    }

    /// Get tool definitions for LLM function calling
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                tool_type: "function".to_string(),
                function: FunctionDefinition {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.parameters_schema(),
                },
            })
            .collect()
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
            if call.input.is_empty() {
                return Err(ToolError::InvalidParameters {
                    message: "empty input".to_string(),
                }
                .into());
            }
            Ok(ToolResult::success(call.id, call.input))
        }
    }

    fn executor() -> ToolExecutor {
        let mut executor = ToolExecutor::new();
        executor.register_tool(Box::new(EchoTool));
        executor
    }

    #[test]
    fn test_default_schema_has_single_input() {
        let schema = EchoTool.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["input"]["type"], "string");
        assert_eq!(schema["required"], json!(["input"]));
    }

    #[tokio::test]
    async fn test_execute_registered_tool() {
        let result = executor()
            .execute(ToolCall::with_id("c1", "echo", "hello"))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.tool_call_id, "c1");
        assert_eq!(result.content, "hello");
        assert!(result.duration_ms.is_some());
    }

    #[tokio::test]
    async fn test_execute_unknown_tool_is_not_found() {
        let err = executor()
            .execute(ToolCall::new("nope", "x"))
            .await
            .unwrap_err();
        match err {
            ToolError::NotFound { name } => assert_eq!(name, "nope"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_tool_error_becomes_error_result() {
        let result = executor()
            .execute(ToolCall::with_id("c2", "echo", ""))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.content.starts_with("Error: "));
    }

    #[test]
    fn test_definitions_match_registered_tools() {
        let executor = executor();
        let definitions = executor.get_tool_definitions();
        assert_eq!(definitions.len(), executor.len());
        assert_eq!(definitions[0].function.name, "echo");
        assert_eq!(definitions[0].tool_type, "function");
    }

    #[test]
    fn test_structured_result_serializes_data() {
        let result = ToolResult::structured("c3", json!({"links": [], "contents": []}));
        assert!(result.success);
        let parsed: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(Some(parsed), result.data);
    }
}
