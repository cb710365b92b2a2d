//! Timezone clock tool

use crate::error::Result;
use crate::impl_tool_factory;
use crate::tools::{Tool, ToolCall, ToolExample, ToolResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const UNKNOWN_TIMEZONE: &str = "Unknown timezone. Please provide a valid timezone.";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z%z";

/// Format `instant` in the IANA zone `zone`, or `None` if the zone is unknown
pub fn format_time_in_zone(zone: &str, instant: DateTime<Utc>) -> Option<String> {
    let tz: Tz = zone.trim().parse().ok()?;
    Some(instant.with_timezone(&tz).format(TIME_FORMAT).to_string())
}

/// Tool returning the current local time of a timezone
pub struct TimeTool;

impl TimeTool {
    pub const NAME: &'static str = "check_time";
    pub const DESCRIPTION: &'static str = "Used to return country's time";

    pub fn new() -> Self {
        Self
    }
}

impl Default for TimeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for TimeTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    fn input_description(&self) -> &str {
        "IANA timezone name, for example Europe/London"
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        match format_time_in_zone(&call.input, Utc::now()) {
            Some(time) => Ok(ToolResult::success(call.id, time)),
            None => {
                tracing::debug!("Unknown timezone requested: {:?}", call.input);
                Ok(ToolResult::failure(call.id, UNKNOWN_TIMEZONE.to_string()))
            }
        }
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample::new(
            "Current time in Tokyo",
            "Asia/Tokyo",
            "2024-01-15 21:00:00 JST+0900",
        )]
    }
}

impl_tool_factory!(TimeToolFactory, TimeTool, TimeTool::NAME, TimeTool::DESCRIPTION);
