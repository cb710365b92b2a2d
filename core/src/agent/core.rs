//! AgentCore implementation

use super::config::AgentConfig;
use super::decision::{Decider, Decision};
use super::prompt::{assemble_prompt, render_instructions, DEFAULT_SYSTEM_PROMPT};
use super::scratchpad::{RunState, ToolInvocation};
use crate::agent::{Agent, AgentExecution, AgentResult};
use crate::error::{AgentError, Result};
use crate::llm::ToolDefinition;
use crate::memory::{MemoryWindow, Turn};
use crate::output::{AgentEvent, AgentOutput, ToolInvocationInfo};
use crate::tools::{ToolCall, ToolExecutor, ToolResult};
use crate::trajectory::{TrajectoryEntry, TrajectoryRecorder};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Conversational agent: a bounded decide/execute loop over a fixed tool set
/// with a rolling memory of past turns
pub struct AgentCore {
    config: AgentConfig,
    decider: Arc<dyn Decider>,
    tool_executor: ToolExecutor,
    tool_definitions: Vec<ToolDefinition>,
    instructions: String,
    memory: MemoryWindow,
    trajectory_recorder: Option<TrajectoryRecorder>,
    output: Box<dyn AgentOutput>,
}

impl AgentCore {
    /// Assemble an agent from its parts. The system prompt is rendered once
    /// here, with the tools registered in `tool_executor`.
    pub fn new(
        config: AgentConfig,
        decider: Arc<dyn Decider>,
        tool_executor: ToolExecutor,
        output: Box<dyn AgentOutput>,
    ) -> Result<Self> {
        config.validate()?;

        let template = config
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let instructions = render_instructions(template, &tool_executor)?;
        let tool_definitions = tool_executor.get_tool_definitions();
        let memory = MemoryWindow::new(config.memory_window);

        Ok(Self {
            config,
            decider,
            tool_executor,
            tool_definitions,
            instructions,
            memory,
            trajectory_recorder: None,
            output,
        })
    }

    /// Get agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Rendered system instructions
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Names of the registered tools
    pub fn tool_names(&self) -> Vec<&str> {
        self.tool_executor.list_tools()
    }

    /// Tool definitions advertised to the model
    pub fn tool_definitions(&self) -> &[ToolDefinition] {
        &self.tool_definitions
    }

    async fn emit(&self, event: AgentEvent) {
        if let Err(e) = self.output.emit_event(event).await {
            debug!("Failed to emit agent event: {}", e);
        }
    }

    /// Transcript failures are logged and never end the run
    async fn record(&self, entry: TrajectoryEntry) {
        if let Some(recorder) = &self.trajectory_recorder {
            if let Err(e) = recorder.record(entry).await {
                warn!("Failed to record trajectory entry: {}", e);
            }
        }
    }

    /// Run the tool. An unknown name becomes an error result and the run
    /// goes on.
    async fn invoke_tool(&self, call: ToolCall) -> ToolResult {
        let call_id = call.id.clone();
        match self.tool_executor.execute(call).await {
            Ok(result) => result,
            Err(e) => ToolResult::error(call_id, e.to_string()),
        }
    }

    /// One decide/execute cycle per iteration until a final answer, a model
    /// failure, or the iteration cap
    async fn run_loop(&self, state: &mut RunState) -> LoopEnd {
        let memory = self.memory.snapshot();

        loop {
            if state.iteration_count() >= self.config.max_iterations {
                info!(
                    "Iteration cap of {} reached without a final answer",
                    self.config.max_iterations
                );
                return LoopEnd::Capped;
            }

            let messages = assemble_prompt(
                &self.instructions,
                &memory,
                state.scratchpad(),
                state.original_input(),
            );
            self.record(TrajectoryEntry::model_request(
                messages.clone(),
                self.decider.model_name().to_string(),
                self.decider.provider_name().to_string(),
                state.iteration_count(),
            ))
            .await;

            let decision = match self.decider.decide(messages, &self.tool_definitions).await {
                Ok(decision) => decision,
                Err(e) => {
                    error!("Model call failed at iteration {}: {}", state.iteration_count(), e);
                    self.record(TrajectoryEntry::error(
                        e.to_string(),
                        Some("model call".to_string()),
                        state.iteration_count(),
                    ))
                    .await;
                    return LoopEnd::Failed;
                }
            };

            match decision {
                Decision::FinalAnswer(answer) => {
                    self.record(TrajectoryEntry::final_answer_decision(
                        answer.clone(),
                        state.iteration_count(),
                    ))
                    .await;
                    return LoopEnd::Answered(answer);
                }
                Decision::ToolCall {
                    id,
                    name,
                    input,
                    commentary,
                } => {
                    let iteration = state.iteration_count() + 1;
                    state.note_commentary(commentary.as_deref());
                    if let Some(text) = commentary.as_deref().filter(|t| !t.trim().is_empty()) {
                        self.emit(AgentEvent::ModelCommentary {
                            iteration,
                            text: text.to_string(),
                        })
                        .await;
                    }
                    self.record(TrajectoryEntry::tool_call_decision(
                        name.clone(),
                        input.clone(),
                        commentary.clone(),
                        iteration,
                    ))
                    .await;

                    debug!("Iteration {}: {}({:?})", iteration, name, input);
                    let started = ToolInvocationInfo::started(
                        id.as_str(),
                        name.as_str(),
                        input.as_str(),
                        iteration,
                    );
                    self.emit(AgentEvent::ToolInvocationStarted {
                        invocation: started.clone(),
                    })
                    .await;

                    let result = self
                        .invoke_tool(ToolCall::with_id(id.as_str(), name.as_str(), input.as_str()))
                        .await;

                    self.emit(AgentEvent::ToolInvocationCompleted {
                        invocation: started.completed(
                            result.success,
                            result.content.as_str(),
                            result.duration_ms,
                        ),
                    })
                    .await;

                    let invocation = ToolInvocation::from_result(&name, &input, &result);
                    self.record(TrajectoryEntry::tool_invocation(
                        invocation.id.clone(),
                        invocation.tool_name.clone(),
                        invocation.input_query.clone(),
                        invocation.output.clone(),
                        invocation.is_success(),
                        iteration,
                    ))
                    .await;
                    state.push(invocation);
                }
            }
        }
    }
}

enum LoopEnd {
    Answered(String),
    Capped,
    Failed,
}

#[async_trait]
impl Agent for AgentCore {
    async fn ask(&mut self, question: &str) -> AgentResult<AgentExecution> {
        if question.trim().is_empty() {
            return Err(AgentError::InvalidQuestion {
                message: "question is empty".to_string(),
            }
            .into());
        }

        let start_time = Instant::now();
        info!("Answering question with up to {} tool calls", self.config.max_iterations);

        self.emit(AgentEvent::RunStarted {
            input: question.to_string(),
            max_iterations: self.config.max_iterations,
        })
        .await;
        self.record(TrajectoryEntry::run_start(
            question.to_string(),
            serde_json::to_value(&self.config).unwrap_or_default(),
        ))
        .await;

        let mut state = RunState::new(question);
        let end = self.run_loop(&mut state).await;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        let last_commentary = state.last_commentary().map(str::to_string);
        let invocations = state.into_scratchpad();
        let execution = match end {
            LoopEnd::Answered(answer) => AgentExecution::answered(answer, invocations, duration_ms),
            LoopEnd::Capped => {
                AgentExecution::capped(last_commentary.as_deref(), invocations, duration_ms)
            }
            LoopEnd::Failed => AgentExecution::failed(invocations, duration_ms),
        };

        if execution.is_remembered() {
            self.memory.append(Turn::user(question));
            self.memory.append(Turn::assistant(execution.answer.as_str()));
        }

        self.record(TrajectoryEntry::run_complete(
            execution.outcome.to_string(),
            execution.answer.clone(),
            execution.iterations,
            duration_ms,
        ))
        .await;
        self.emit(AgentEvent::RunCompleted {
            outcome: execution.outcome,
            iterations: execution.iterations,
            duration: start_time.elapsed(),
        })
        .await;

        info!(
            "Run {} after {} tool calls in {} ms",
            execution.outcome, execution.iterations, duration_ms
        );
        Ok(execution)
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn agent_type(&self) -> &str {
        "scout_agent"
    }

    fn memory(&self) -> &MemoryWindow {
        &self.memory
    }

    fn clear_memory(&mut self) {
        self.memory.clear();
    }

    fn set_trajectory_recorder(&mut self, recorder: TrajectoryRecorder) {
        self.trajectory_recorder = Some(recorder);
    }

    fn trajectory_recorder(&self) -> Option<&TrajectoryRecorder> {
        self.trajectory_recorder.as_ref()
    }
}
