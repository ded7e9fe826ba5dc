//! # Web Search Tool
//!
//! Tavily-backed web search exposed as a [`ToolProtocol`]. Agents call the
//! `web_search` tool with a query string and receive markdown-formatted
//! results (title, content snippet, source URL).
//!
//! ## Configuration
//!
//! - API key: pass it to [`WebSearchTool::new`] or read it from the
//!   `TAVILY_API_KEY` environment variable via [`WebSearchTool::from_env`].
//! - `with_search_depth("basic" | "advanced")` — defaults to `"advanced"`.
//! - `with_max_results(n)` — defaults to 5.
//!
//! ## Example
//!
//! ```rust,no_run
//! use caravan::tools::WebSearchTool;
//!
//! # async {
//! let tool = WebSearchTool::from_env()?
//!     .with_search_depth("advanced")
//!     .with_max_results(5);
//!
//! let report = tool.search("latest trends in AI for 2025").await?;
//! println!("{}", report);
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! # };
//! ```

use crate::caravan::tool_protocol::{
    ToolError, ToolMetadata, ToolParameter, ToolParameterType, ToolProtocol, ToolResult,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error;
use std::time::Duration;

/// Tavily search endpoint.
const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// One result entry in a Tavily response.
#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// The subset of the Tavily response body this tool consumes.
#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

/// Web search tool backed by the Tavily REST API.
pub struct WebSearchTool {
    api_key: String,
    client: reqwest::Client,
    search_depth: String,
    max_results: usize,
}

impl WebSearchTool {
    /// Create a tool with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            search_depth: "advanced".to_string(),
            max_results: 5,
        }
    }

    /// Create a tool from the `TAVILY_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let api_key = std::env::var("TAVILY_API_KEY").map_err(|_| {
            Box::new(ToolError::ProtocolError(
                "TAVILY_API_KEY environment variable is required".to_string(),
            )) as Box<dyn Error + Send + Sync>
        })?;
        Ok(Self::new(api_key))
    }

    /// Override the search depth (`"basic"` or `"advanced"`).
    pub fn with_search_depth(mut self, depth: impl Into<String>) -> Self {
        self.search_depth = depth.into();
        self
    }

    /// Override the number of results requested per query.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Run a query and render the results as markdown.
    pub async fn search(&self, query: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        log::info!("WebSearchTool::search(query={})", query);

        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .json(&serde_json::json!({
                "api_key": self.api_key,
                "query": query,
                "search_depth": self.search_depth,
                "max_results": self.max_results,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Box::new(ToolError::ExecutionFailed(format!(
                "Search API returned status: {}",
                response.status()
            ))));
        }

        let body: TavilyResponse = response.json().await?;
        Ok(format_results(&body.results))
    }
}

/// Render search results as a markdown list, one entry per source.
fn format_results(results: &[TavilyResult]) -> String {
    if results.is_empty() {
        return "No results found".to_string();
    }

    let formatted: Vec<String> = results
        .iter()
        .map(|item| {
            format!(
                "- **{}**: {}\n  Source: {}",
                if item.title.is_empty() { "N/A" } else { &item.title },
                if item.content.is_empty() { "N/A" } else { &item.content },
                if item.url.is_empty() { "N/A" } else { &item.url },
            )
        })
        .collect();

    formatted.join("\n\n")
}

#[async_trait]
impl ToolProtocol for WebSearchTool {
    async fn execute(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>> {
        if tool_name != "web_search" {
            return Err(Box::new(ToolError::NotFound(tool_name.to_string())));
        }

        let query = match parameters.get("query").and_then(|v| v.as_str()) {
            Some(query) if !query.is_empty() => query,
            _ => {
                return Ok(ToolResult::failure(
                    "Parameter 'query' is required".to_string(),
                ))
            }
        };

        match self.search(query).await {
            Ok(report) => Ok(ToolResult::success(serde_json::Value::String(report))),
            Err(e) => Ok(ToolResult::failure(e.to_string())),
        }
    }

    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>> {
        Ok(vec![ToolMetadata::new(
            "web_search",
            "Search the web and return the most relevant results in markdown",
        )
        .with_parameter(
            ToolParameter::new("query", ToolParameterType::String)
                .with_description("The search query")
                .required(),
        )])
    }

    fn protocol_name(&self) -> &str {
        "web-search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_results_markdown() {
        let results = vec![
            TavilyResult {
                title: "ENIT".to_string(),
                url: "https://enit.rnu.tn".to_string(),
                content: "National engineering school in Tunis".to_string(),
            },
            TavilyResult {
                title: String::new(),
                url: String::new(),
                content: "Orphan snippet".to_string(),
            },
        ];

        let report = format_results(&results);
        assert!(report.contains("- **ENIT**: National engineering school in Tunis"));
        assert!(report.contains("Source: https://enit.rnu.tn"));
        assert!(report.contains("- **N/A**: Orphan snippet"));
    }

    #[test]
    fn test_format_results_empty() {
        assert_eq!(format_results(&[]), "No results found");
    }

    #[tokio::test]
    async fn test_missing_query_is_failure_result() {
        let tool = WebSearchTool::new("test-key");
        let result = tool
            .execute("web_search", serde_json::json!({}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("query"));
    }

    #[tokio::test]
    async fn test_unknown_tool_name() {
        let tool = WebSearchTool::new("test-key");
        assert!(tool.execute("other", serde_json::json!({})).await.is_err());
    }
}
