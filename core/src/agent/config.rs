//! Agent configuration structures

use crate::config::{ResolvedLlmConfig, ToolSettings};
use crate::error::{AgentError, Result};
use crate::memory::DEFAULT_MEMORY_WINDOW;
use crate::output::AgentOutput;
use crate::tools::{ToolRegistry, BUILTIN_TOOLS};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::decision::Decider;

/// Default cap on tool round-trips per question
pub const DEFAULT_MAX_ITERATIONS: usize = 8;

/// Configuration for an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum number of tool round-trips per question
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Number of conversation turns kept in memory
    #[serde(default = "default_memory_window")]
    pub memory_window: usize,

    /// List of tools available to this agent
    #[serde(default = "default_tools")]
    pub tools: Vec<String>,

    /// Custom system prompt for the agent (optional)
    /// If not provided, the default system prompt will be used
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_memory_window() -> usize {
    DEFAULT_MEMORY_WINDOW
}

fn default_tools() -> Vec<String> {
    BUILTIN_TOOLS.iter().map(|name| name.to_string()).collect()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            memory_window: default_memory_window(),
            tools: default_tools(),
            system_prompt: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(AgentError::InvalidIterationCap {
                value: self.max_iterations,
            }
            .into());
        }
        if self.memory_window == 0 {
            return Err(AgentError::InvalidMemoryWindow {
                value: self.memory_window,
            }
            .into());
        }
        Ok(())
    }
}

/// Builder for creating agents with resolved configuration
pub struct AgentBuilder {
    llm_config: ResolvedLlmConfig,
    tool_settings: ToolSettings,
    agent_config: AgentConfig,
    decider: Option<Arc<dyn Decider>>,
    tool_registry: Option<ToolRegistry>,
}

impl AgentBuilder {
    /// Create a new agent builder with LLM and tool configuration
    pub fn new(llm_config: ResolvedLlmConfig, tool_settings: ToolSettings) -> Self {
        Self {
            llm_config,
            tool_settings,
            agent_config: AgentConfig::default(),
            decider: None,
            tool_registry: None,
        }
    }

    /// Set agent configuration
    pub fn with_agent_config(mut self, agent_config: AgentConfig) -> Self {
        self.agent_config = agent_config;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.agent_config.max_iterations = max_iterations;
        self
    }

    pub fn with_memory_window(mut self, memory_window: usize) -> Self {
        self.agent_config.memory_window = memory_window;
        self
    }

    /// Set tools
    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.agent_config.tools = tools;
        self
    }

    /// Set system prompt
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.agent_config.system_prompt = system_prompt;
        self
    }

    /// Use this decider instead of one backed by the configured model
    pub fn with_decider(mut self, decider: Arc<dyn Decider>) -> Self {
        self.decider = Some(decider);
        self
    }

    /// Use this registry instead of the built-in one
    pub fn with_tool_registry(mut self, registry: ToolRegistry) -> Self {
        self.tool_registry = Some(registry);
        self
    }

    /// Build the agent with the given output handler
    pub fn build_with_output(self, output: Box<dyn AgentOutput>) -> Result<super::AgentCore> {
        self.agent_config.validate()?;

        let decider = match self.decider {
            Some(decider) => decider,
            None => {
                self.llm_config.validate()?;
                let client = crate::llm::client_for_config(&self.llm_config)?;
                let options = crate::llm::ChatOptions::from_params(&self.llm_config.params);
                Arc::new(super::LlmDecider::new(client, options))
            }
        };

        let registry = match self.tool_registry {
            Some(registry) => registry,
            None => ToolRegistry::with_settings(&self.tool_settings),
        };
        let tool_executor = registry.create_executor(&self.agent_config.tools)?;

        super::AgentCore::new(self.agent_config, decider, tool_executor, output)
    }

    /// Build the agent with null output (for testing)
    pub fn build(self) -> Result<super::AgentCore> {
        use crate::output::NullOutput;
        self.build_with_output(Box::new(NullOutput))
    }
}
