//! CLI configuration loader for Scout
//!
//! Settings are layered, lowest priority first:
//! 1. One config file, the first found of:
//!    `--config` file/dir, `./scout.json`, `./.scout/config.json`,
//!    `<git root>/.scout/config.json`, `<config dir>/scout/config.json`
//! 2. Environment variables
//! 3. Command-line flags
//!
//! Any string in the file may be written as `env:VAR_NAME`.

use anyhow::{anyhow, Context, Result};
use scout_core::config::{SearchSettings, WeatherSettings};
use scout_core::error::ConfigError;
use scout_core::{AgentConfig, ModelParams, Protocol, ResolvedLlmConfig, ToolSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Raw configuration file format. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `azure_openai` or `openai_compat`
    pub protocol: Option<String>,
    /// Azure resource endpoint or OpenAI-compatible base URL
    #[serde(alias = "base_url")]
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Azure REST API version
    pub api_version: Option<String>,
    /// Azure deployment id or model name
    #[serde(alias = "model")]
    pub deployment: Option<String>,
    pub params: ModelParams,
    pub search: RawSearchConfig,
    pub weather: RawWeatherConfig,
    pub agent: RawAgentConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSearchConfig {
    pub endpoint: Option<String>,
    pub subscription_key: Option<String>,
    pub result_count: Option<usize>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawWeatherConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAgentConfig {
    pub max_iterations: Option<usize>,
    pub memory_window: Option<usize>,
    pub tools: Option<Vec<String>>,
    pub system_prompt: Option<String>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub protocol: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    pub deployment: Option<String>,
    pub weather_api_key: Option<String>,
    pub search_key: Option<String>,
    pub max_iterations: Option<usize>,
    pub memory_window: Option<usize>,
}

/// Everything needed to build an agent
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub llm: ResolvedLlmConfig,
    pub tools: ToolSettings,
    pub agent: AgentConfig,
    /// File the settings came from, if any
    pub source: Option<PathBuf>,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// CLI configuration loader
pub struct CliConfigLoader {
    config_override: Option<PathBuf>,
    overrides: CliOverrides,
    working_dir: Option<PathBuf>,
    user_config_dir: Option<Option<PathBuf>>,
    env: EnvLookup,
}

impl CliConfigLoader {
    /// Create a new loader reading the process environment
    pub fn new() -> Self {
        Self {
            config_override: None,
            overrides: CliOverrides::default(),
            working_dir: None,
            user_config_dir: None,
            env: Box::new(|name: &str| std::env::var(name).ok().filter(|v| !v.is_empty())),
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set command-line overrides
    pub fn with_overrides(mut self, overrides: CliOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Search for config files from `dir` instead of the current directory
    #[cfg(test)]
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    /// Use `dir` (or nothing) as the per-user config directory
    #[cfg(test)]
    pub fn with_user_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.user_config_dir = Some(dir);
        self
    }

    /// Replace the environment lookup
    #[cfg(test)]
    pub fn with_env<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(env);
        self
    }

    fn env_var(&self, name: &str) -> Option<String> {
        (self.env)(name)
    }

    /// Load, layer and validate configuration
    pub async fn load(&self) -> Result<LoadedConfig> {
        let (raw, source) = match &self.config_override {
            Some(path) => {
                let raw = self.load_from_path(path).await.with_context(|| {
                    format!("Failed to load config from override path: {}", path.display())
                })?;
                (raw, Some(path.clone()))
            }
            None => match self.find_config_file()? {
                Some(path) => (self.load_file(&path).await?, Some(path)),
                None => (RawConfig::default(), None),
            },
        };

        match &source {
            Some(path) => debug!("Using config file {}", path.display()),
            None => debug!("No config file found, using environment and flags"),
        }

        let raw = self.resolve_env_references(raw)?;
        let raw = self.apply_env(raw)?;
        let raw = self.apply_overrides(raw);
        let mut loaded = self.resolve(raw)?;
        loaded.source = source;
        Ok(loaded)
    }

    /// First existing config file in search order
    fn find_config_file(&self) -> Result<Option<PathBuf>> {
        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        let mut candidates = vec![
            cwd.join("scout.json"),
            cwd.join(".scout").join("config.json"),
        ];
        if let Some(git_root) = find_git_root(&cwd) {
            candidates.push(git_root.join(".scout").join("config.json"));
        }
        let user_dir = match &self.user_config_dir {
            Some(dir) => dir.clone(),
            None => dirs::config_dir(),
        };
        if let Some(dir) = user_dir {
            candidates.push(dir.join("scout").join("config.json"));
        }

        Ok(candidates.into_iter().find(|path| path.is_file()))
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Replace `env:VAR` values from the file with the variable's value
    fn resolve_env_references(&self, mut raw: RawConfig) -> Result<RawConfig> {
        let fields = [
            &mut raw.protocol,
            &mut raw.endpoint,
            &mut raw.api_key,
            &mut raw.api_version,
            &mut raw.deployment,
            &mut raw.search.endpoint,
            &mut raw.search.subscription_key,
            &mut raw.search.user_agent,
            &mut raw.weather.base_url,
            &mut raw.weather.api_key,
            &mut raw.agent.system_prompt,
        ];

        for field in fields {
            if let Some(var_name) = field.as_deref().and_then(|v| v.strip_prefix("env:")) {
                let value = self
                    .env_var(var_name)
                    .with_context(|| format!("Environment variable not found: {}", var_name))?;
                *field = Some(value);
            }
        }

        Ok(raw)
    }

    /// Apply environment variables on top of the file
    fn apply_env(&self, mut raw: RawConfig) -> Result<RawConfig> {
        if let Some(protocol) = self.env_var("SCOUT_PROTOCOL") {
            raw.protocol = Some(protocol);
        }

        let protocol = self.protocol_for(&raw)?;
        let (endpoint_var, key_var, model_var) = match protocol {
            Protocol::AzureOpenAI => (
                "AZURE_OPENAI_ENDPOINT",
                "AZURE_OPENAI_API_KEY",
                "CHAT_DEPLOYMENT",
            ),
            Protocol::OpenAICompat => ("OPENAI_BASE_URL", "OPENAI_API_KEY", "OPENAI_MODEL"),
        };

        set_from(&mut raw.endpoint, self.env_var(endpoint_var));
        set_from(&mut raw.api_key, self.env_var(key_var));
        set_from(&mut raw.deployment, self.env_var(model_var));
        if protocol == Protocol::AzureOpenAI {
            set_from(&mut raw.api_version, self.env_var("OPENAI_API_VERSION"));
        }

        set_from(&mut raw.weather.api_key, self.env_var("WEATHER_API_KEY"));
        set_from(&mut raw.weather.base_url, self.env_var("WEATHER_BASE_URL"));
        set_from(&mut raw.search.subscription_key, self.env_var("BING_SUBSCRIPTION_KEY"));
        set_from(&mut raw.search.endpoint, self.env_var("BING_SEARCH_URL"));

        Ok(raw)
    }

    /// Apply command-line flags on top of everything else
    fn apply_overrides(&self, mut raw: RawConfig) -> RawConfig {
        let flags = self.overrides.clone();
        set_from(&mut raw.protocol, flags.protocol);
        set_from(&mut raw.endpoint, flags.endpoint);
        set_from(&mut raw.api_key, flags.api_key);
        set_from(&mut raw.api_version, flags.api_version);
        set_from(&mut raw.deployment, flags.deployment);
        set_from(&mut raw.weather.api_key, flags.weather_api_key);
        set_from(&mut raw.search.subscription_key, flags.search_key);
        set_from(&mut raw.agent.max_iterations, flags.max_iterations);
        set_from(&mut raw.agent.memory_window, flags.memory_window);
        raw
    }

    /// Protocol in effect: flag, then what the file/environment say, then Azure
    fn protocol_for(&self, raw: &RawConfig) -> Result<Protocol> {
        let name = self
            .overrides
            .protocol
            .as_deref()
            .or(raw.protocol.as_deref());
        match name {
            Some(name) => name
                .parse::<Protocol>()
                .map_err(|e| anyhow!("Configuration validation failed: {}", e)),
            None => Ok(Protocol::AzureOpenAI),
        }
    }

    /// Turn layered raw settings into validated core configuration
    fn resolve(&self, raw: RawConfig) -> Result<LoadedConfig> {
        let protocol = self.protocol_for(&raw)?;

        let base_url = raw
            .endpoint
            .or_else(|| protocol.default_base_url().map(str::to_string))
            .unwrap_or_default();

        let mut llm = ResolvedLlmConfig::new(
            protocol.clone(),
            base_url,
            raw.api_key.unwrap_or_default(),
            raw.deployment.unwrap_or_default(),
        )
        .with_params(raw.params);
        if let Some(api_version) = raw.api_version {
            llm = llm.with_api_version(api_version);
        }

        llm.validate().map_err(|e| validation_error(&protocol, &e))?;

        let search_defaults = SearchSettings::default();
        let weather_defaults = WeatherSettings::default();
        let tools = ToolSettings {
            search: SearchSettings {
                endpoint: raw.search.endpoint.unwrap_or(search_defaults.endpoint),
                subscription_key: raw.search.subscription_key.unwrap_or_default(),
                result_count: raw.search.result_count.unwrap_or(search_defaults.result_count),
                user_agent: raw.search.user_agent.unwrap_or(search_defaults.user_agent),
            },
            weather: WeatherSettings {
                base_url: raw.weather.base_url.unwrap_or(weather_defaults.base_url),
                api_key: raw.weather.api_key.unwrap_or_default(),
            },
        };
        tools.validate().map_err(|e| validation_error(&protocol, &e))?;

        let defaults = AgentConfig::default();
        let agent = AgentConfig {
            max_iterations: raw.agent.max_iterations.unwrap_or(defaults.max_iterations),
            memory_window: raw.agent.memory_window.unwrap_or(defaults.memory_window),
            tools: raw.agent.tools.unwrap_or(defaults.tools),
            system_prompt: raw.agent.system_prompt,
        };
        agent
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(LoadedConfig {
            llm,
            tools,
            agent,
            source: None,
        })
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn set_from<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

fn validation_error(protocol: &Protocol, error: &ConfigError) -> anyhow::Error {
    let message = error.to_string();
    anyhow!(
        "Configuration validation failed: {}{}",
        message,
        hint(protocol, &message)
    )
}

/// Where a missing setting can be supplied
fn hint(protocol: &Protocol, message: &str) -> &'static str {
    let azure = *protocol == Protocol::AzureOpenAI;
    if message.contains("search.subscription_key") {
        " (set BING_SUBSCRIPTION_KEY or --search-key)"
    } else if message.contains("weather.api_key") {
        " (set WEATHER_API_KEY or --weather-api-key)"
    } else if message.contains("api_key") {
        if azure {
            " (set AZURE_OPENAI_API_KEY or --api-key)"
        } else {
            " (set OPENAI_API_KEY or --api-key)"
        }
    } else if message.contains("deployment") {
        " (set CHAT_DEPLOYMENT or --deployment)"
    } else if message.contains("field: model") {
        " (set OPENAI_MODEL or --deployment)"
    } else if message.contains("endpoint") && azure {
        " (set AZURE_OPENAI_ENDPOINT or --endpoint)"
    } else {
        ""
    }
}

/// Find the enclosing git repository root
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}
