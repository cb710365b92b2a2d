//! Resolved configuration types for Scout core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in CLI layer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Default Azure OpenAI REST API version
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-10-21";

/// Default Bing Web Search endpoint
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";

/// Default weatherapi.com base URL
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Number of search results fetched per web-content lookup
pub const DEFAULT_SEARCH_RESULT_COUNT: usize = 3;

/// Browser-like client identity sent when fetching result pages
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Supported LLM protocols
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// Azure OpenAI chat deployment
    #[serde(rename = "azure_openai")]
    AzureOpenAI,
    /// OpenAI-compatible API (OpenAI, proxies, local servers)
    #[serde(rename = "openai_compat")]
    OpenAICompat,
}

impl Protocol {
    /// Get the protocol name as a string
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::AzureOpenAI => "azure_openai",
            Protocol::OpenAICompat => "openai_compat",
        }
    }

    /// Get the default base URL for this protocol
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Protocol::OpenAICompat => Some("https://api.openai.com/v1"),
            Protocol::AzureOpenAI => None, // Requires the resource endpoint
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure" | "azure_openai" => Ok(Protocol::AzureOpenAI),
            "openai" | "openai_compat" => Ok(Protocol::OpenAICompat),
            other => Err(ConfigError::InvalidValue {
                field: "protocol".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Model parameters for LLM requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 to 2.0)
    pub temperature: Option<f32>,
    /// Top-p sampling parameter
    pub top_p: Option<f32>,
}

/// A fully resolved LLM configuration ready for use by core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLlmConfig {
    /// The protocol to use
    pub protocol: Protocol,
    /// Base URL for the API (Azure resource endpoint for Azure)
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Model name, or deployment id for Azure
    pub model: String,
    /// REST API version, only used by Azure
    #[serde(default)]
    pub api_version: Option<String>,
    /// Model parameters
    #[serde(default)]
    pub params: ModelParams,
}

impl ResolvedLlmConfig {
    /// Create a new resolved LLM config
    pub fn new(protocol: Protocol, base_url: String, api_key: String, model: String) -> Self {
        Self {
            protocol,
            base_url,
            api_key,
            model,
            api_version: None,
            params: ModelParams::default(),
        }
    }

    /// Set the API version
    pub fn with_api_version(mut self, api_version: String) -> Self {
        self.api_version = Some(api_version);
        self
    }

    /// Set model parameters
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// API version to send, falling back to the default for Azure
    pub fn api_version_or_default(&self) -> &str {
        self.api_version
            .as_deref()
            .unwrap_or(DEFAULT_AZURE_API_VERSION)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(missing("api_key"));
        }

        if self.model.is_empty() {
            return Err(missing(match self.protocol {
                Protocol::AzureOpenAI => "deployment",
                Protocol::OpenAICompat => "model",
            }));
        }

        if self.base_url.is_empty() {
            return Err(missing("endpoint"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "endpoint".to_string(),
                value: self.base_url.clone(),
            });
        }

        if let Some(temp) = self.params.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(ConfigError::InvalidValue {
                    field: "params.temperature".to_string(),
                    value: temp.to_string(),
                });
            }
        }

        if let Some(top_p) = self.params.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(ConfigError::InvalidValue {
                    field: "params.top_p".to_string(),
                    value: top_p.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Settings for the web search provider and page fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Bing Web Search endpoint
    pub endpoint: String,
    /// Bing subscription key
    pub subscription_key: String,
    /// Number of result links to fetch per query
    pub result_count: usize,
    /// User-Agent header sent when fetching result pages
    pub user_agent: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            subscription_key: String::new(),
            result_count: DEFAULT_SEARCH_RESULT_COUNT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Settings for the weather provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSettings {
    /// Base URL of the weather API
    pub base_url: String,
    /// Weather API key
    pub api_key: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            api_key: String::new(),
        }
    }
}

/// Credentials and endpoints for the built-in tools
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
}

impl ToolSettings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.subscription_key.is_empty() {
            return Err(missing("search.subscription_key"));
        }
        if self.search.result_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.result_count".to_string(),
                value: "0".to_string(),
            });
        }
        if self.weather.api_key.is_empty() {
            return Err(missing("weather.api_key"));
        }
        Ok(())
    }
}

fn missing(field: &str) -> ConfigError {
    ConfigError::MissingField {
        field: field.to_string(),
    }
}
