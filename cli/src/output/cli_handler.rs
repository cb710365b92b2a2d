//! CLI output handler implementation

use super::formatters::{format_commentary, format_run_summary, ToolFormatter};
use async_trait::async_trait;
use scout_core::output::{AgentEvent, AgentOutput, OutputResult};
use std::io::Write;
use std::sync::Mutex;
use tracing::debug;

/// CLI output configuration
#[derive(Debug, Clone)]
pub struct CliOutputConfig {
    /// Show tool calls and model commentary while a question is answered
    pub verbose: bool,
}

impl Default for CliOutputConfig {
    fn default() -> Self {
        Self { verbose: true }
    }
}

/// Renders run progress to a writer (stderr by default) so the answer on
/// stdout stays clean
pub struct CliOutputHandler {
    config: CliOutputConfig,
    tool_formatter: ToolFormatter,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl CliOutputHandler {
    /// Create a new CLI output handler
    pub fn new(config: CliOutputConfig) -> Self {
        Self::with_writer(config, Box::new(std::io::stderr()))
    }

    /// Create a handler that writes to `sink`
    pub fn with_writer(config: CliOutputConfig, sink: Box<dyn Write + Send>) -> Self {
        Self {
            config,
            tool_formatter: ToolFormatter::new(),
            sink: Mutex::new(sink),
        }
    }

    /// Lines to print for an event
    pub fn format_event(&self, event: &AgentEvent) -> Vec<String> {
        if !self.config.verbose {
            return Vec::new();
        }

        match event {
            AgentEvent::RunStarted { .. } => Vec::new(),

            AgentEvent::ModelCommentary { text, .. } => vec![format_commentary(text)],

            AgentEvent::ToolInvocationStarted { invocation } => {
                vec![self.tool_formatter.format_tool_status(invocation)]
            }

            AgentEvent::ToolInvocationCompleted { invocation } => {
                let mut lines = vec![self.tool_formatter.format_tool_status(invocation)];
                lines.extend(self.tool_formatter.format_tool_result(invocation));
                lines
            }

            AgentEvent::RunCompleted {
                outcome,
                iterations,
                duration,
            } => vec![format_run_summary(*outcome, *iterations, *duration)],
        }
    }
}

impl Default for CliOutputHandler {
    fn default() -> Self {
        Self::new(CliOutputConfig::default())
    }
}

#[async_trait]
impl AgentOutput for CliOutputHandler {
    async fn emit_event(&self, event: AgentEvent) -> OutputResult {
        if let AgentEvent::RunStarted {
            input,
            max_iterations,
        } = &event
        {
            debug!("Answering '{}' with up to {} tool calls", input, max_iterations);
        }

        let lines = self.format_event(&event);
        if lines.is_empty() {
            return Ok(());
        }

        let mut sink = self
            .sink
            .lock()
            .map_err(|_| "output writer lock poisoned")?;
        for line in lines {
            writeln!(sink, "{}", line)?;
        }
        sink.flush()?;

        Ok(())
    }
}
