//! Weather lookup tool

use crate::config::WeatherSettings;
use crate::error::Result;
use crate::tools::{Tool, ToolCall, ToolExample, ToolResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::warn;

pub const WEATHER_FAILURE: &str = "Failed to get weather data.";

/// Tool returning the current conditions for a city from weatherapi.com
pub struct WeatherTool {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherTool {
    pub const NAME: &'static str = "check_weather";
    pub const DESCRIPTION: &'static str = "Used to find weather information about a city";

    pub fn new(settings: &WeatherSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(client: Client, settings: &WeatherSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        }
    }

    /// Current weather payload for `city`, or `None` on any failure
    pub async fn current(&self, city: &str) -> Option<Value> {
        let url = format!("{}/current.json", self.base_url);
        let response = match self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Weather request failed: {}", e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            warn!("Weather provider returned HTTP {}", response.status().as_u16());
            return None;
        }

        match response.json::<Value>().await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Weather payload was not JSON: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    fn input_description(&self) -> &str {
        "Name of the city"
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        Ok(match self.current(call.input.trim()).await {
            Some(payload) => ToolResult::structured(call.id, payload),
            None => ToolResult::failure(call.id, WEATHER_FAILURE.to_string()),
        })
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample::new(
            "Current weather in Paris",
            "Paris",
            "weatherapi.com current conditions as JSON",
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::stub_server::{client, StubResponse, StubServer};

    fn tool(server: &StubServer) -> WeatherTool {
        WeatherTool::with_client(
            client(),
            &WeatherSettings {
                base_url: server.url("/v1/"),
                api_key: "k123".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_success_passes_payload_through() {
        let body = r#"{"location":{"name":"Paris"},"current":{"temp_c":18.0}}"#;
        let server =
            StubServer::start(vec![("/v1/current.json", StubResponse::json(200, body))]).await;

        let result = tool(&server)
            .execute(ToolCall::with_id("c1", "check_weather", "Paris"))
            .await
            .unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["location"]["name"], "Paris");
        assert_eq!(data["current"]["temp_c"], 18.0);

        let request = server.requests().remove(0);
        assert!(request.starts_with("GET /v1/current.json?key=k123&q=Paris "));
    }

    #[tokio::test]
    async fn test_non_200_is_fixed_failure() {
        for status in [400u16, 403, 404, 500, 201] {
            let server = StubServer::start(vec![(
                "/v1/current.json",
                StubResponse::json(
                    status,
                    r#"{"error":{"message":"No matching location found."}}"#,
                ),
            )])
            .await;

            let result = tool(&server)
                .execute(ToolCall::with_id("c1", "check_weather", "Atlantis"))
                .await
                .unwrap();
            assert!(!result.success);
            assert_eq!(result.content, WEATHER_FAILURE);
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_fixed_failure() {
        let server = StubServer::start(vec![(
            "/v1/current.json",
            StubResponse::with_content_type(200, "text/plain", "sunny"),
        )])
        .await;

        let result = tool(&server)
            .execute(ToolCall::with_id("c1", "check_weather", "Paris"))
            .await
            .unwrap();
        assert_eq!(result.content, WEATHER_FAILURE);
    }

    #[tokio::test]
    async fn test_connection_error_is_fixed_failure() {
        let weather = WeatherTool::with_client(
            client(),
            &WeatherSettings {
                base_url: "http://127.0.0.1:1".to_string(),
                api_key: "k".to_string(),
            },
        );
        assert!(weather.current("Paris").await.is_none());
    }
}
