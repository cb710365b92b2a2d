//! Web search plus page-content extraction tool

use crate::config::SearchSettings;
use crate::error::{Result, ToolError};
use crate::tools::{Tool, ToolCall, ToolExample, ToolResult};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Elements whose text never counts as visible page content
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// A single search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Source of candidate links for a query
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>>;
}

/// Bing Web Search v7 client
pub struct BingSearch {
    client: Client,
    endpoint: String,
    subscription_key: String,
}

#[derive(Debug, Deserialize)]
struct BingResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingWebPage>,
}

#[derive(Debug, Deserialize)]
struct BingWebPage {
    name: String,
    url: String,
    #[serde(default)]
    snippet: String,
}

impl BingSearch {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        subscription_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            subscription_key: subscription_key.into(),
        }
    }
}

#[async_trait]
impl SearchProvider for BingSearch {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .query(&[("q", query), ("count", &count.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::ExecutionFailed {
                name: "bing_search".to_string(),
                message: format!("search provider returned HTTP {}", status.as_u16()),
            }
            .into());
        }

        let body: BingResponse = response.json().await?;
        let results = body
            .web_pages
            .map(|pages| pages.value)
            .unwrap_or_default()
            .into_iter()
            .take(count)
            .map(|page| SearchResult {
                title: page.name,
                link: page.url,
                snippet: page.snippet,
            })
            .collect();

        Ok(results)
    }
}

/// Why a single result page was skipped
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("not an http(s) URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("document has no body")]
    NoBody,
}

/// Fetches a page and returns its visible body text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Plain HTTP page fetcher with a browser-like identity
pub struct HttpPageFetcher {
    client: Client,
    user_agent: String,
}

impl HttpPageFetcher {
    pub fn new(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let response = self
            .client
            .get(parsed)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_textual_content_type(content_type) {
                return Err(FetchError::UnsupportedContentType(content_type.to_string()));
            }
        }

        let html = response.text().await?;
        extract_body_text(&html).ok_or(FetchError::NoBody)
    }
}

fn is_textual_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type.starts_with("text/") || media_type.contains("html") || media_type.contains("xml")
}

/// Visible text of the document's `<body>`, with every whitespace run
/// collapsed to a single space. `None` if the document has no body.
pub fn extract_body_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("body").ok()?;
    let body = document.select(&selector).next()?;

    let mut text = String::new();
    for node in body.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if !hidden {
            text.push_str(fragment);
        }
    }

    Some(collapse_whitespace(&text))
}

/// Replace each run of whitespace (newlines included) with one space and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Page texts and their source links, index-aligned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebContent {
    pub contents: Vec<String>,
    pub links: Vec<String>,
}

impl WebContent {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Tool that searches the web and returns the text of the top result pages
pub struct WebContentTool {
    search: Box<dyn SearchProvider>,
    fetcher: Box<dyn PageFetcher>,
    result_count: usize,
}

impl WebContentTool {
    pub const NAME: &'static str = "bing_search";
    pub const DESCRIPTION: &'static str = "Search Bing for recent results.";

    pub fn new(settings: &SearchSettings) -> Self {
        let client = Client::new();
        Self {
            search: Box::new(BingSearch::new(
                client.clone(),
                settings.endpoint.clone(),
                settings.subscription_key.clone(),
            )),
            fetcher: Box::new(HttpPageFetcher::new(client, settings.user_agent.clone())),
            result_count: settings.result_count,
        }
    }

    pub fn with_parts(
        search: Box<dyn SearchProvider>,
        fetcher: Box<dyn PageFetcher>,
        result_count: usize,
    ) -> Self {
        Self {
            search,
            fetcher,
            result_count,
        }
    }

    /// Search for `query` and fetch each result page in turn. Pages that fail
    /// are left out; a failed search yields an empty result.
    pub async fn fetch_web_content(&self, query: &str) -> WebContent {
        let results = match self.search.search(query, self.result_count).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Search failed for {:?}, treating as no results: {}", query, e);
                Vec::new()
            }
        };
        debug!("Search returned {} candidate links", results.len());

        let mut fetched = Vec::with_capacity(results.len());
        for result in results {
            let page = self.fetcher.fetch_text(&result.link).await;
            fetched.push((result.link, page));
        }

        let mut content = WebContent::default();
        for (link, page) in fetched {
            match page {
                Ok(text) => {
                    content.contents.push(text);
                    content.links.push(link);
                }
                Err(e) => warn!("Skipping {}: {}", link, e),
            }
        }
        content
    }
}

#[async_trait]
impl Tool for WebContentTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    fn input_description(&self) -> &str {
        "The search query"
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let content = self.fetch_web_content(call.input.trim()).await;
        let data = serde_json::to_value(&content)?;
        Ok(ToolResult::structured(call.id, data))
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample::new(
            "Look up a recent event",
            "latest Rust release",
            "JSON object with page contents and their links",
        )]
    }
}
