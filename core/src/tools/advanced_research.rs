use crate::tools::{SEARCH_API_URL, SearchRequest, extract_string_arg, format_results};
use crate::traits::{SideEffect, Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;

/// In-depth web research: higher result limit and deeper search, for content
/// that needs authoritative sources.
pub struct AdvancedResearchTool {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl AdvancedResearchTool {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { client, api_key }
    }
}

#[async_trait]
impl Tool for AdvancedResearchTool {
    fn name(&self) -> &str {
        "advanced_research"
    }

    fn description(&self) -> &str {
        "Perform in-depth web research on a topic, with comprehensive results \
from authoritative sources"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Topic to research"
                }
            },
            "required": ["query"]
        })
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::NetworkIo
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let query = extract_string_arg(&args, "query")?;

        let Some(api_key) = &self.api_key else {
            return Ok(ToolResult::error("TAVILY_API_KEY is not set"));
        };

        let request = SearchRequest {
            api_key,
            query: &query,
            search_depth: "advanced",
            max_results: 10,
            include_images: false,
        };

        let response = self
            .client
            .post(SEARCH_API_URL)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("search API error {}", response.status());
        }

        let results = response.json().await?;
        Ok(ToolResult::success(format_results(&query, &results)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_is_an_observation_not_a_transport_error() {
        let tool = AdvancedResearchTool::new(None);
        let result = tool.execute(json!({"query": "rust"})).await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("TAVILY_API_KEY"));
    }

    #[tokio::test]
    async fn missing_query_is_an_argument_error() {
        let tool = AdvancedResearchTool::new(Some("key".to_string()));
        assert!(tool.execute(json!({})).await.is_err());
    }
}
