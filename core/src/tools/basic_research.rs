use crate::tools::{SEARCH_API_URL, SearchRequest, extract_string_arg, format_results};
use crate::traits::{SideEffect, Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;

/// Quick trending-topic research: fewer results, shallow search, images
/// included, tuned for social content.
pub struct BasicResearchTool {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl BasicResearchTool {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { client, api_key }
    }
}

#[async_trait]
impl Tool for BasicResearchTool {
    fn name(&self) -> &str {
        "basic_research"
    }

    fn description(&self) -> &str {
        "Research trending topics with quick, concise results"
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

        let trending_query = format!("trending {query}");
        let request = SearchRequest {
            api_key,
            query: &trending_query,
            search_depth: "basic",
            max_results: 5,
            include_images: true,
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
        Ok(ToolResult::success(format_results(&trending_query, &results)))
    }
}
