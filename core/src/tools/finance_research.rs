use crate::tools::extract_string_arg;
use crate::traits::{SideEffect, Tool, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::fmt::Write;

const SEARCH_URL: &str = "https://query1.finance.yahoo.com/v1/finance/search";
const NEWS_COUNT: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    publisher: String,
    #[serde(default)]
    link: String,
}

/// Financial news lookup for a ticker symbol, backed by the Yahoo Finance
/// search endpoint.
pub struct FinanceResearchTool {
    client: reqwest::Client,
}

impl FinanceResearchTool {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { client }
    }
}

impl Default for FinanceResearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FinanceResearchTool {
    fn name(&self) -> &str {
        "finance_research"
    }

    fn description(&self) -> &str {
        "Search for financial data and news, must be a ticker symbol"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "ticker_symbol": {
                    "type": "string",
                    "description": "Stock ticker symbol to research, e.g. AAPL"
                }
            },
            "required": ["ticker_symbol"]
        })
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::NetworkIo
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let ticker = extract_string_arg(&args, "ticker_symbol")?;

        let news_count = NEWS_COUNT.to_string();
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("q", ticker.as_str()),
                ("newsCount", news_count.as_str()),
                ("quotesCount", "0"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Yahoo Finance error {}", response.status());
        }

        let search: SearchResponse = response.json().await?;
        if search.news.is_empty() {
            return Ok(ToolResult::success(format!(
                "No recent news found for '{ticker}'"
            )));
        }

        let mut output = String::new();
        for item in &search.news {
            let _ = writeln!(output, "- {} ({}) {}", item.title, item.publisher, item.link);
        }
        Ok(ToolResult::success(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_ticker_is_an_argument_error() {
        let tool = FinanceResearchTool::new();
        assert!(tool.execute(json!({})).await.is_err());
    }

    #[test]
    fn spec_requires_the_ticker_symbol() {
        let spec = FinanceResearchTool::new().spec();
        assert_eq!(spec.name, "finance_research");
        assert_eq!(spec.parameters_schema["required"][0], "ticker_symbol");
    }
}
