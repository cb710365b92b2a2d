//! Formatting utilities for CLI output

use console::Style;
use scout_core::output::{ToolExecutionStatus, ToolInvocationInfo};
use scout_core::RunOutcome;
use std::time::Duration;

/// Longest tool output shown before truncation
const MAX_RESULT_CHARS: usize = 200;

/// Tool invocation formatter
pub struct ToolFormatter;

impl ToolFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Status line, e.g. `⏺ check_time(Asia/Tokyo)`
    pub fn format_tool_status(&self, info: &ToolInvocationInfo) -> String {
        let dot = match info.status {
            ToolExecutionStatus::Executing => Style::new().white(),
            ToolExecutionStatus::Success => Style::new().green(),
            ToolExecutionStatus::Error => Style::new().red(),
        };

        format!("{} {}({})", dot.apply_to("⏺"), info.tool_name, info.input)
    }

    /// Indented tool output, truncated
    pub fn format_tool_result(&self, info: &ToolInvocationInfo) -> Option<String> {
        let output = info.output.as_deref()?.trim();
        if output.is_empty() {
            return None;
        }

        let display = if output.chars().count() > MAX_RESULT_CHARS {
            let head: String = output.chars().take(MAX_RESULT_CHARS - 3).collect();
            format!("{}...", head)
        } else {
            output.to_string()
        };
        let display = display.replace('\n', " ");

        Some(format!("  ⎿  {}", display))
    }
}

impl Default for ToolFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Model text emitted alongside a tool call
pub fn format_commentary(text: &str) -> String {
    Style::new().dim().apply_to(text.trim()).to_string()
}

/// One-line run summary
pub fn format_run_summary(outcome: RunOutcome, iterations: usize, duration: Duration) -> String {
    let style = match outcome {
        RunOutcome::Answered => Style::new().green(),
        RunOutcome::Capped => Style::new().yellow(),
        RunOutcome::Failed => Style::new().red(),
    };
    let steps = if iterations == 1 { "tool call" } else { "tool calls" };

    format!(
        "{} after {} {} in {:.2}s",
        style.apply_to(outcome.as_str()),
        iterations,
        steps,
        duration.as_secs_f64()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_shows_tool_and_input() {
        let info = ToolInvocationInfo::started("c1", "check_time", "Asia/Tokyo", 1);
        let line = console::strip_ansi_codes(&ToolFormatter::new().format_tool_status(&info))
            .to_string();
        assert_eq!(line, "⏺ check_time(Asia/Tokyo)");
    }

    #[test]
    fn test_result_is_truncated_and_flattened() {
        let formatter = ToolFormatter::new();
        let pending = ToolInvocationInfo::started("c1", "bing_search", "rust", 1);
        assert!(formatter.format_tool_result(&pending).is_none());

        let long = "x".repeat(500);
        let done = pending.clone().completed(true, long, Some(10));
        let shown = formatter.format_tool_result(&done).unwrap();
        assert!(shown.starts_with("  ⎿  "));
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), "  ⎿  ".chars().count() + MAX_RESULT_CHARS);

        let multi = pending.completed(true, "line one\nline two", None);
        assert_eq!(
            formatter.format_tool_result(&multi).unwrap(),
            "  ⎿  line one line two"
        );
    }

    #[test]
    fn test_run_summary() {
        let summary = format_run_summary(RunOutcome::Capped, 1, Duration::from_millis(1500));
        let plain = console::strip_ansi_codes(&summary).to_string();
        assert_eq!(plain, "capped after 1 tool call in 1.50s");
    }
}
