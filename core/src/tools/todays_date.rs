use crate::tools::DATE_FORMAT;
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;

pub struct TodaysDateTool;

impl TodaysDateTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TodaysDateTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for TodaysDateTool {
    fn name(&self) -> &str {
        "get_todays_date"
    }

    fn description(&self) -> &str {
        "Get the current date"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: serde_json::Value) -> anyhow::Result<ToolResult> {
        Ok(ToolResult::success(
            chrono::Local::now().format(DATE_FORMAT).to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_an_iso_date() {
        let result = TodaysDateTool::new().execute(json!({})).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output.len(), 10);
        assert_eq!(result.output.matches('-').count(), 2);
    }
}
