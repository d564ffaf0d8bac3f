use crate::agent::ToolRegistry;
use crate::error::AssemblyError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;
use std::sync::Arc;

pub mod advanced_research;
pub mod basic_research;
pub mod finance_research;
pub mod todays_date;

pub use advanced_research::AdvancedResearchTool;
pub use basic_research::BasicResearchTool;
pub use finance_research::FinanceResearchTool;
pub use todays_date::TodaysDateTool;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) const SEARCH_API_URL: &str = "https://api.tavily.com/search";

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub api_key: &'a str,
    pub query: &'a str,
    pub search_depth: &'a str,
    pub max_results: usize,
    pub include_images: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResults {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

pub(crate) fn format_results(query: &str, results: &SearchResults) -> String {
    if results.results.is_empty() {
        return format!("No results found for '{query}'");
    }

    let mut output = String::new();
    for result in &results.results {
        let _ = writeln!(output, "- {} ({})\n  {}", result.title, result.url, result.content);
    }
    output
}

pub fn extract_string_arg(args: &Value, key: &str) -> anyhow::Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' parameter", key))
        .map(|s| s.to_string())
}

pub fn extract_string_arg_opt(args: &Value, key: &str, default: &str) -> String {
    args.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or(default)
        .to_string()
}

/// Build a registry holding the full built-in tool surface. The search API
/// key is passed in explicitly; callers typically resolve it from
/// `TAVILY_API_KEY`.
pub fn default_registry(search_api_key: Option<String>) -> Result<ToolRegistry, AssemblyError> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(TodaysDateTool::new()))?;
    registry.register(Arc::new(FinanceResearchTool::new()))?;
    registry.register(Arc::new(AdvancedResearchTool::new(search_api_key.clone())))?;
    registry.register(Arc::new(BasicResearchTool::new(search_api_key)))?;
    Ok(registry)
}
