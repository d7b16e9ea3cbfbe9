//! Chat client for the hosted LLM service.
//!
//! Speaks the Ollama-compatible `/api/chat` protocol with optional
//! tool definitions. The endpoint is treated as an opaque boundary;
//! only the request/response shapes used by the agents are modeled.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Message in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallMessage>>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain("user", content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::plain("tool", content)
    }

    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            tool_calls: None,
        }
    }
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallMessage {
    pub function: ToolCallFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallFunction {
    pub name: String,
    pub arguments: Value,
}

/// Chat API request.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "slice_is_empty")]
    tools: &'a [Value],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

fn slice_is_empty(slice: &&[Value]) -> bool {
    slice.is_empty()
}

/// Chat API response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

/// The assistant message returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallMessage>>,
}

/// Configuration for the chat client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub retries: usize,
}

impl From<&crate::config::ModelConfig> for LlmConfig {
    fn from(config: &crate::config::ModelConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            model_name: config.name.clone(),
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
            retries: config.retries,
        }
    }
}

/// Client for the chat endpoint shared by every agent.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http_client: reqwest::Client,
}

impl LlmClient {
    /// Create a new client.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Send a chat request and return the assistant message.
    ///
    /// Transport failures (timeout, refused connection) are retried up
    /// to the configured count; API-level errors are not.
    pub async fn chat(&self, messages: &[ChatMessage], tools: &[Value]) -> Result<ResponseMessage> {
        let mut last_err = None;

        for attempt in 0..=self.config.retries {
            if attempt > 0 {
                warn!("Retrying chat request (attempt {})", attempt + 1);
                tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
            }

            match self.send_chat(messages, tools).await {
                Ok(message) => return Ok(message),
                Err(ChatError::Transport(err)) => last_err = Some(err),
                Err(ChatError::Api(err)) => return Err(err),
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Chat request failed")))
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
    ) -> std::result::Result<ResponseMessage, ChatError> {
        let url = format!("{}/api/chat", self.config.api_url.trim_end_matches('/'));

        let request = ChatRequest {
            model: &self.config.model_name,
            messages,
            tools,
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        };

        debug!("Sending chat request with {} messages", messages.len());

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    anyhow::anyhow!(
                        "Request timed out after {}s. Try a different model.",
                        self.config.timeout_seconds
                    )
                } else if e.is_connect() {
                    anyhow::anyhow!(
                        "Cannot connect to the chat API at {}. Is it running?",
                        self.config.api_url
                    )
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e)
                };
                ChatError::Transport(err)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api(anyhow::anyhow!(
                "Chat API error {}: {}",
                status,
                body
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat response")
            .map_err(ChatError::Api)?;

        Ok(chat_response.message)
    }
}

enum ChatError {
    /// Network-level failure, worth retrying.
    Transport(anyhow::Error),
    /// The API answered but with an error; retrying won't help.
    Api(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_url: String) -> LlmConfig {
        LlmConfig {
            api_url,
            model_name: "test-model".to_string(),
            temperature: 0.3,
            timeout_seconds: 5,
            retries: 0,
        }
    }

    #[tokio::test]
    async fn test_chat_returns_assistant_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"model": "test-model"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "hello"},
                "done": true
            })))
            .mount(&server)
            .await;

        let client = LlmClient::new(test_config(server.uri())).unwrap();
        let message = client
            .chat(&[ChatMessage::user("hi")], &[])
            .await
            .unwrap();

        assert_eq!(message.content, "hello");
        assert!(message.tool_calls.is_none());
    }

    #[tokio::test]
    async fn test_chat_parses_tool_calls() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [
                        {"function": {"name": "scrape_website",
                                      "arguments": {"url": "https://example.com"}}}
                    ]
                },
                "done": true
            })))
            .mount(&server)
            .await;

        let client = LlmClient::new(test_config(server.uri())).unwrap();
        let message = client
            .chat(&[ChatMessage::user("go")], &[])
            .await
            .unwrap();

        let calls = message.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "scrape_website");
    }

    #[tokio::test]
    async fn test_chat_transport_error_is_retried() {
        let server = MockServer::start().await;

        // First attempt stalls past the client timeout
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(json!({
                        "message": {"role": "assistant", "content": "late"},
                        "done": true
                    })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "recovered"},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = test_config(server.uri());
        config.timeout_seconds = 1;
        config.retries = 1;

        let client = LlmClient::new(config).unwrap();
        let message = client
            .chat(&[ChatMessage::user("hi")], &[])
            .await
            .unwrap();

        assert_eq!(message.content, "recovered");
    }

    #[tokio::test]
    async fn test_chat_transport_errors_exhaust_retries() {
        // Nothing is listening on the endpoint, so every attempt fails
        // at transport level and the last error surfaces
        let config = LlmConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            model_name: "test-model".to_string(),
            temperature: 0.3,
            timeout_seconds: 1,
            retries: 1,
        };

        let client = LlmClient::new(config).unwrap();
        let result = client.chat(&[ChatMessage::user("hi")], &[]).await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Cannot connect to the chat API"));
    }

    #[tokio::test]
    async fn test_chat_api_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = test_config(server.uri());
        config.retries = 2;

        let client = LlmClient::new(config).unwrap();
        let result = client.chat(&[ChatMessage::user("hi")], &[]).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("500"));
    }
}
