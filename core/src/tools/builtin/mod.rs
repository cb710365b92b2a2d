//! Built-in tools

pub mod time;
pub mod weather;
pub mod web_content;

#[cfg(test)]
pub(crate) mod stub_server;

pub use time::{format_time_in_zone, TimeTool, TimeToolFactory, UNKNOWN_TIMEZONE};
pub use weather::{WeatherTool, WEATHER_FAILURE};
pub use web_content::{
    collapse_whitespace, extract_body_text, BingSearch, FetchError, HttpPageFetcher, PageFetcher,
    SearchProvider, SearchResult, WebContent, WebContentTool,
};
