//! LLM provider implementations

pub mod openai;

pub use openai::{client_for_config, AzureOpenAiClient, OpenAiClient};
