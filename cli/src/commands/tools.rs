//! Tools listing command

use anyhow::Result;
use scout_core::tools::ToolRegistry;
use tracing::info;

/// Show available tools
pub async fn tools_command() -> Result<()> {
    info!("Listing available tools");
    print!("{}", render_tool_list(&ToolRegistry::default()));
    Ok(())
}

fn render_tool_list(registry: &ToolRegistry) -> String {
    let mut out = String::from("Available tools\n\n");

    for name in registry.list_tools() {
        if let Some((tool_name, description)) = registry.get_tool_info(name) {
            let first_line = description.lines().next().unwrap_or(description);
            out.push_str(&format!("  {}\n      {}\n", tool_name, first_line));
        }
        if let Some(tool) = registry.create_tool(name) {
            for example in tool.examples() {
                out.push_str(&format!(
                    "      e.g. {}: {}(\"{}\") -> {}\n",
                    example.description, name, example.input, example.expected_result
                ));
            }
        }
        out.push('\n');
    }

    out
}
