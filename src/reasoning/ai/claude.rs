//! Anthropic Messages API client.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    build_http_client, check_error_response, log_response_success, transport_error, AiClient,
    AiClientMetadata, MAX_OUTPUT_TOKENS,
};
use crate::reasoning::error::ReasoningError;

/// Public Anthropic API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
}

/// Claude API client.
pub struct ClaudeAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeAiClient {
    /// Creates a client against the public Anthropic endpoint.
    pub fn new(model: String, api_key: String) -> Result<Self> {
        Self::with_base_url(model, api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Creates a client against a custom endpoint.
    pub fn with_base_url(model: String, api_key: String, base_url: String) -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

impl AiClient for ClaudeAiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                system_prompt_len = system_prompt.len(),
                user_prompt_len = user_prompt.len(),
                model = %self.model,
                "Preparing Claude API request"
            );

            let request = ClaudeRequest {
                model: &self.model,
                max_tokens: MAX_OUTPUT_TOKENS,
                system: system_prompt,
                messages: vec![Message {
                    role: "user",
                    content: user_prompt,
                }],
            };

            let url = self.messages_url();
            info!(url = %url, model = %self.model, "Sending request to Claude API");

            let response = self
                .client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| transport_error(&e))?;

            let response = check_error_response(response).await?;

            let claude_response: ClaudeResponse = response
                .json()
                .await
                .map_err(|e| ReasoningError::InvalidResponseFormat(e.to_string()))?;

            let result = claude_response
                .content
                .iter()
                .find(|c| c.content_type == "text")
                .map(|c| c.text.clone())
                .ok_or_else(|| {
                    ReasoningError::InvalidResponseFormat("No text content in response".to_string())
                        .into()
                });

            log_response_success("Claude", &result);
            result
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: "Anthropic".to_string(),
            model: self.model.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::reasoning::error::FailureKind;

    async fn client_for(server: &MockServer) -> ClaudeAiClient {
        ClaudeAiClient::with_base_url(DEFAULT_MODEL.to_string(), "test-key".to_string(), server.uri())
            .unwrap()
    }

    #[tokio::test]
    async fn extracts_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "thinking", "thinking": "..."},
                    {"type": "text", "text": "[]"}
                ]
            })))
            .mount(&server)
            .await;

        let text = client_for(&server).await.send_request("sys", "user").await.unwrap();
        assert_eq!(text, "[]");
    }

    #[tokio::test]
    async fn rate_limit_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.send_request("sys", "user").await.unwrap_err();
        assert_eq!(FailureKind::classify(&err), FailureKind::RateLimited);
    }

    #[tokio::test]
    async fn server_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.send_request("sys", "user").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("500"), "{message}");
        assert!(message.contains("overloaded"), "{message}");
        assert_eq!(FailureKind::classify(&err), FailureKind::Other);
    }

    #[tokio::test]
    async fn response_without_text_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.send_request("sys", "user").await.unwrap_err();
        assert_eq!(FailureKind::classify(&err), FailureKind::MalformedOutput);
    }

    #[test]
    fn metadata_names_provider() {
        let client = ClaudeAiClient::new("m".to_string(), "k".to_string()).unwrap();
        assert_eq!(client.get_metadata().provider, "Anthropic");
        assert_eq!(client.get_metadata().model, "m");
    }
}
