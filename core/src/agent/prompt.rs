//! System instructions and prompt assembly

use crate::agent::scratchpad::ToolInvocation;
use crate::error::Result;
use crate::llm::LlmMessage;
use crate::memory::{Turn, TurnRole};
use crate::tools::{ToolExecutor, TOOL_INPUT_KEY};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

/// Default system instructions. Rendered with the registered tools.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an AI assistant who can access the internet through the bing_search tool and time information through the check_time tool.
The bing_search tool returns the content of web pages that you can use to answer the user's question.
Whenever asked about time and date use the check_time tool, and for weather related questions use the check_weather tool and just provide a short answer.
For other questions provide at most one paragraph unless instructed otherwise.
If you get blocked or access is denied, try another query for the bing_search tool to reach a different website.
Talk a bit to the user while grabbing the result.
Always provide the link in the following format: "Used this link: {link} to answer your question."

Available tools:
{{#each tools}}
- {{name}}: {{description}}
{{/each}}"#;

#[derive(Debug, Serialize)]
struct ToolSummary<'a> {
    name: &'a str,
    description: &'a str,
}

/// Render the instruction template with the tools in `executor`.
///
/// The template sees `tools`, a list of `{name, description}`. Output is not
/// HTML-escaped.
pub fn render_instructions(template: &str, executor: &ToolExecutor) -> Result<String> {
    let tools: Vec<ToolSummary<'_>> = executor
        .tools()
        .map(|tool| ToolSummary {
            name: tool.name(),
            description: tool.description(),
        })
        .collect();

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    let rendered = handlebars.render_template(template, &json!({ "tools": tools }))?;
    Ok(rendered.trim_end().to_string())
}

/// Build the model's message list for one decision.
///
/// Order: system instructions, memory turns (oldest first), one
/// tool-call/tool-result pair per scratchpad record, then the current input.
pub fn assemble_prompt(
    instructions: &str,
    memory: &[Turn],
    scratchpad: &[ToolInvocation],
    input: &str,
) -> Vec<LlmMessage> {
    let mut messages = Vec::with_capacity(2 + memory.len() + scratchpad.len() * 2);
    messages.push(LlmMessage::system(instructions));

    for turn in memory {
        messages.push(match turn.role() {
            TurnRole::User => LlmMessage::user(turn.content()),
            TurnRole::Assistant | TurnRole::Tool => LlmMessage::assistant(turn.content()),
        });
    }

    for invocation in scratchpad {
        messages.push(LlmMessage::tool_use(
            invocation.id.as_str(),
            invocation.tool_name.as_str(),
            json!({ TOOL_INPUT_KEY: invocation.input_query }),
        ));
        messages.push(LlmMessage::tool_result(
            invocation.id.as_str(),
            invocation.output.as_str(),
            !invocation.is_success(),
        ));
    }

    messages.push(LlmMessage::user(input));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::scratchpad::InvocationOutcome;
    use crate::llm::{ContentBlock, MessageContent, MessageRole};
    use crate::tools::ToolRegistry;

    fn invocation(id: &str, tool: &str, input: &str, output: &str) -> ToolInvocation {
        ToolInvocation {
            id: id.to_string(),
            tool_name: tool.to_string(),
            input_query: input.to_string(),
            output: output.to_string(),
            outcome: InvocationOutcome::Success,
        }
    }

    #[test]
    fn test_default_prompt_lists_tools() {
        let executor = ToolRegistry::default().create_executor_with_all();
        let rendered = render_instructions(DEFAULT_SYSTEM_PROMPT, &executor).unwrap();

        assert!(rendered.contains("- bing_search: Search Bing for recent results."));
        assert!(rendered.contains("- check_time: Used to return country's time"));
        assert!(
            rendered.contains("- check_weather: Used to find weather information about a city")
        );
        assert!(rendered.contains("Used this link: {link}"));
        assert!(!rendered.contains("&#x27;"));
    }

    #[test]
    fn test_custom_template_is_rendered() {
        let executor = ToolRegistry::default().create_executor_with_all();
        let rendered =
            render_instructions("Tools: {{#each tools}}{{name}} {{/each}}", &executor).unwrap();
        assert_eq!(rendered, "Tools: bing_search check_time check_weather");
    }

    #[test]
    fn test_plain_custom_prompt_passes_through() {
        let executor = ToolExecutor::new();
        assert_eq!(
            render_instructions("Be brief.", &executor).unwrap(),
            "Be brief."
        );
    }

    #[test]
    fn test_assemble_prompt_order() {
        let memory = vec![Turn::user("Hi"), Turn::assistant("Hello!")];
        let scratchpad = vec![
            invocation("c1", "check_time", "Europe/London", "2024-01-15 12:00:00 GMT+0000"),
            invocation("c2", "check_weather", "London", "{}"),
        ];

        let messages = assemble_prompt("sys", &memory, &scratchpad, "What time is it?");
        let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::Assistant,
                MessageRole::Tool,
                MessageRole::Assistant,
                MessageRole::Tool,
                MessageRole::User,
            ]
        );
        assert_eq!(messages[0].get_text().as_deref(), Some("sys"));
        assert_eq!(messages[1].get_text().as_deref(), Some("Hi"));
        assert_eq!(messages[7].get_text().as_deref(), Some("What time is it?"));

        match &messages[3].content {
            MessageContent::Blocks(blocks) => match &blocks[0] {
                ContentBlock::ToolUse { id, name, input } => {
                    assert_eq!(id, "c1");
                    assert_eq!(name, "check_time");
                    assert_eq!(input["input"], "Europe/London");
                }
                other => panic!("unexpected block {:?}", other),
            },
            other => panic!("unexpected content {:?}", other),
        }

        match &messages[4].content {
            MessageContent::Blocks(blocks) => match &blocks[0] {
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => {
                    assert_eq!(tool_use_id, "c1");
                    assert_eq!(content, "2024-01-15 12:00:00 GMT+0000");
                    assert_eq!(*is_error, Some(false));
                }
                other => panic!("unexpected block {:?}", other),
            },
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_assemble_prompt_minimal() {
        let messages = assemble_prompt("sys", &[], &[], "q");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, MessageRole::User);
    }
}
