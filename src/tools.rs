//! Web tools exposed to the specialist agents.
//!
//! Two tools are available: internet search (Serper-compatible API)
//! and website scraping (HTML fetched and reduced to visible text).
//! Tool failures are returned as error strings in place of a result,
//! which the agents feed back to the model as ordinary text.

use crate::config::{ScrapeConfig, SearchConfig};
use crate::models::SearchHit;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Tool definition for the chat API.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

/// Result of executing a tool.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
}

impl ToolResult {
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            output: message,
        }
    }
}

/// Failure modes of the web tools. Rendered to strings for the model.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Error performing search: {0}")]
    Search(String),

    #[error("Error scraping website: {0}")]
    Scrape(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Names a specialist can be granted access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebTool {
    Search,
    Scrape,
}

impl WebTool {
    pub fn name(&self) -> &'static str {
        match self {
            WebTool::Search => "search_internet",
            WebTool::Scrape => "scrape_website",
        }
    }
}

/// Executes web tool calls on behalf of the agents.
pub struct WebToolExecutor {
    http_client: reqwest::Client,
    search: SearchConfig,
    scrape: ScrapeConfig,
}

impl WebToolExecutor {
    /// Create a new executor from tool configuration.
    pub fn new(search: SearchConfig, scrape: ScrapeConfig) -> Self {
        Self {
            // Per-request timeouts; search and scrape differ
            http_client: reqwest::Client::new(),
            search,
            scrape,
        }
    }

    /// Execute a tool call and return the result.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        debug!("Executing tool: {} with args: {}", call.name, call.arguments);

        let outcome = match call.name.as_str() {
            "search_internet" => self.search_internet(&call.arguments).await,
            "scrape_website" => self.scrape_website(&call.arguments).await,
            other => Err(ToolError::UnknownTool(other.to_string())),
        };

        match outcome {
            Ok(output) => ToolResult::success(output),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }

    /// Search the internet for a query and format the top organic hits.
    async fn search_internet(&self, args: &Value) -> Result<String, ToolError> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or(ToolError::MissingParameter("query"))?;

        let api_key = self
            .search
            .resolve_api_key()
            .ok_or_else(|| ToolError::Search("SERPER_API_KEY is not set".to_string()))?;

        let response = self
            .http_client
            .post(&self.search.endpoint)
            .header("X-API-KEY", api_key)
            .json(&json!({ "q": query }))
            .timeout(Duration::from_secs(self.search.timeout_seconds))
            .send()
            .await
            .map_err(|e| ToolError::Search(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::Search(format!(
                "search API returned {}",
                response.status()
            )));
        }

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Search(e.to_string()))?;

        let output: Vec<String> = results
            .organic
            .iter()
            .take(self.search.max_results)
            .map(|hit| hit.to_string())
            .collect();

        if output.is_empty() {
            Ok("No results found.".to_string())
        } else {
            Ok(output.join("\n"))
        }
    }

    /// Scrape a web page and return its visible text, truncated.
    async fn scrape_website(&self, args: &Value) -> Result<String, ToolError> {
        let raw_url = args
            .get("url")
            .and_then(|v| v.as_str())
            .ok_or(ToolError::MissingParameter("url"))?;

        let target = url::Url::parse(raw_url)
            .map_err(|e| ToolError::Scrape(format!("invalid URL {}: {}", raw_url, e)))?;

        let response = self
            .http_client
            .get(target)
            .header("User-Agent", &self.scrape.user_agent)
            .timeout(Duration::from_secs(self.scrape.timeout_seconds))
            .send()
            .await
            .map_err(|e| ToolError::Scrape(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::Scrape(format!(
                "server returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ToolError::Scrape(e.to_string()))?;

        Ok(extract_text(&body, self.scrape.max_chars))
    }
}

/// Serper-style search response; only the organic list is used.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

/// Elements whose text content is never visible.
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "head"];

/// Extract visible text from an HTML document.
///
/// Script/style/noscript content is dropped, lines are trimmed,
/// double-space runs split into separate lines, and blank lines
/// removed. The result is truncated to `max_chars` characters.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    let mut raw = String::new();
    let body_selector = Selector::parse("body").expect("static selector");

    if let Some(body) = document.select(&body_selector).next() {
        collect_text(body, &mut raw);
    } else {
        collect_text(document.root_element(), &mut raw);
    }

    let cleaned = cleanup_text(&raw);
    truncate_chars(&cleaned, max_chars).to_string()
}

fn collect_text(element: ElementRef, out: &mut String) {
    if SKIPPED_ELEMENTS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
            out.push('\n');
        }
    }
}

/// Normalize extracted text: trim lines, break double-space runs into
/// separate lines, drop blanks.
fn cleanup_text(raw: &str) -> String {
    raw.lines()
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate at the last char boundary at or before `max_chars`.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}

/// Tool definitions for the given set of web tools.
pub fn web_tool_definitions(tools: &[WebTool]) -> Vec<ToolDefinition> {
    tools
        .iter()
        .map(|tool| match tool {
            WebTool::Search => ToolDefinition {
                tool_type: "function".to_string(),
                function: FunctionDefinition {
                    name: tool.name().to_string(),
                    description:
                        "Search the internet for a given query. Returns the top results."
                            .to_string(),
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "query": {
                                "type": "string",
                                "description": "The search query"
                            }
                        },
                        "required": ["query"]
                    }),
                },
            },
            WebTool::Scrape => ToolDefinition {
                tool_type: "function".to_string(),
                function: FunctionDefinition {
                    name: tool.name().to_string(),
                    description: "Scrape the content of a website given its URL.".to_string(),
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "url": {
                                "type": "string",
                                "description": "Full URL of the page to scrape"
                            }
                        },
                        "required": ["url"]
                    }),
                },
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn executor_for(server: &MockServer) -> WebToolExecutor {
        let search = SearchConfig {
            endpoint: format!("{}/search", server.uri()),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        WebToolExecutor::new(search, ScrapeConfig::default())
    }

    #[test]
    fn test_extract_text_strips_scripts_and_styles() {
        let html = r#"<html><head><title>T</title><style>p { color: red }</style></head>
            <body><script>var x = 1;</script><p>Hello world</p><p>Second  para</p></body></html>"#;

        let text = extract_text(html, 8000);
        assert!(text.contains("Hello world"));
        assert!(text.contains("Second"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_extract_text_splits_double_spaces() {
        let text = cleanup_text("first  second\n\n  third  ");
        assert_eq!(text, "first\nsecond\nthird");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "héllo wörld";
        let truncated = truncate_chars(s, 4);
        assert_eq!(truncated, "héll");

        // Shorter than the limit: untouched
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_extract_text_truncates() {
        let html = format!("<html><body><p>{}</p></body></html>", "a".repeat(10_000));
        let text = extract_text(&html, 8000);
        assert_eq!(text.chars().count(), 8000);
    }

    #[test]
    fn test_tool_definitions() {
        let defs = web_tool_definitions(&[WebTool::Search, WebTool::Scrape]);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].function.name, "search_internet");
        assert_eq!(defs[1].function.name, "scrape_website");

        let only_search = web_tool_definitions(&[WebTool::Search]);
        assert_eq!(only_search.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_returns_error_result() {
        let server = MockServer::start().await;
        let executor = executor_for(&server);

        let result = executor
            .execute(&ToolCall {
                name: "launch_rockets".to_string(),
                arguments: json!({}),
            })
            .await;

        assert!(!result.success);
        assert!(result.output.contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_search_formats_hits() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("X-API-KEY", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": [
                    {"title": "First", "link": "https://a.example", "snippet": "one"},
                    {"title": "Second", "link": "https://b.example", "snippet": "two"}
                ]
            })))
            .mount(&server)
            .await;

        let executor = executor_for(&server);
        let result = executor
            .execute(&ToolCall {
                name: "search_internet".to_string(),
                arguments: json!({"query": "veterinary clinics"}),
            })
            .await;

        assert!(result.success);
        assert!(result.output.contains("Title: First"));
        assert!(result.output.contains("Link: https://b.example"));
    }

    #[tokio::test]
    async fn test_search_empty_results() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let executor = executor_for(&server);
        let result = executor
            .execute(&ToolCall {
                name: "search_internet".to_string(),
                arguments: json!({"query": "nothing"}),
            })
            .await;

        assert!(result.success);
        assert_eq!(result.output, "No results found.");
    }

    #[tokio::test]
    async fn test_search_timeout_becomes_error_string() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(serde_json::json!({"organic": []})),
            )
            .mount(&server)
            .await;

        let search = SearchConfig {
            endpoint: format!("{}/search", server.uri()),
            api_key: Some("test-key".to_string()),
            timeout_seconds: 1,
            ..Default::default()
        };
        let executor = WebToolExecutor::new(search, ScrapeConfig::default());

        let result = executor
            .execute(&ToolCall {
                name: "search_internet".to_string(),
                arguments: json!({"query": "anything"}),
            })
            .await;

        assert!(!result.success);
        assert!(result.output.starts_with("Error performing search:"));
    }

    #[tokio::test]
    async fn test_scrape_extracts_page_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><h1>Farm Vaccines</h1><script>track()</script>\
                 <p>Cattle vaccination schedules.</p></body></html>",
            ))
            .mount(&server)
            .await;

        let executor = executor_for(&server);
        let result = executor
            .execute(&ToolCall {
                name: "scrape_website".to_string(),
                arguments: json!({"url": format!("{}/page", server.uri())}),
            })
            .await;

        assert!(result.success);
        assert!(result.output.contains("Farm Vaccines"));
        assert!(result.output.contains("Cattle vaccination schedules."));
        assert!(!result.output.contains("track()"));
    }

    #[tokio::test]
    async fn test_scrape_http_error_becomes_error_string() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let executor = executor_for(&server);
        let result = executor
            .execute(&ToolCall {
                name: "scrape_website".to_string(),
                arguments: json!({"url": format!("{}/missing", server.uri())}),
            })
            .await;

        assert!(!result.success);
        assert!(result.output.starts_with("Error scraping website:"));
    }

    #[tokio::test]
    async fn test_missing_parameter() {
        let server = MockServer::start().await;
        let executor = executor_for(&server);

        let result = executor
            .execute(&ToolCall {
                name: "scrape_website".to_string(),
                arguments: json!({}),
            })
            .await;

        assert!(!result.success);
        assert!(result.output.contains("Missing required parameter: url"));
    }
}
