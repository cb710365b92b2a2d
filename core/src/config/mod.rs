//! Minimal configuration module for Scout core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{
    ModelParams, Protocol, ResolvedLlmConfig, SearchSettings, ToolSettings, WeatherSettings,
    DEFAULT_AZURE_API_VERSION, DEFAULT_SEARCH_ENDPOINT, DEFAULT_SEARCH_RESULT_COUNT,
    DEFAULT_USER_AGENT, DEFAULT_WEATHER_BASE_URL,
};
