//! Clock tool: current local time.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use deskmate_core::error::ToolError;
use deskmate_core::tool::{Tool, ToolResult};

pub struct TimeTool;

pub fn describe_time(now: &DateTime<Local>) -> String {
    format!("Son las {}", now.format("%H:%M:%S"))
}

#[async_trait]
impl Tool for TimeTool {
    fn name(&self) -> &str {
        "get_time"
    }

    fn description(&self) -> &str {
        "Obtiene la hora actual"
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let now = Local::now();
        let mut result = ToolResult::text(describe_time(&now));
        result.data = Some(serde_json::json!({ "timestamp": now.to_rfc3339() }));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_hours_minutes_seconds() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).unwrap();
        assert_eq!(describe_time(&at), "Son las 07:05:03");
    }

    #[tokio::test]
    async fn execute_returns_clock_reading() {
        let result = TimeTool.execute(serde_json::json!({})).await.unwrap();
        let clock = result.output.strip_prefix("Son las ").unwrap();
        assert_eq!(clock.len(), 8);
        assert_eq!(clock.matches(':').count(), 2);
    }
}
