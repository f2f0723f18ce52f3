//! Google Gemini `generateContent` client.

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

/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [PartRef<'a>; 1],
}

#[derive(Serialize)]
struct PartRef<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: [PartRef<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: SystemInstruction<'a>,
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Gemini API client.
pub struct GeminiAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAiClient {
    /// Creates a client against the public Gemini endpoint.
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

    fn generate_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

impl AiClient for GeminiAiClient {
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
                "Preparing Gemini API request"
            );

            let request = GeminiRequest {
                system_instruction: SystemInstruction {
                    parts: [PartRef {
                        text: system_prompt,
                    }],
                },
                contents: [RequestContent {
                    role: "user",
                    parts: [PartRef { text: user_prompt }],
                }],
                generation_config: GenerationConfig {
                    max_output_tokens: MAX_OUTPUT_TOKENS,
                    temperature: 0.2,
                },
            };

            let url = self.generate_url();
            info!(url = %url, model = %self.model, "Sending request to Gemini API");

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| transport_error(&e))?;

            let response = check_error_response(response).await?;

            let gemini_response: GeminiResponse = response
                .json()
                .await
                .map_err(|e| ReasoningError::InvalidResponseFormat(e.to_string()))?;

            let result = gemini_response
                .candidates
                .into_iter()
                .find_map(|c| c.content)
                .map(|content| {
                    content
                        .parts
                        .into_iter()
                        .map(|p| p.text)
                        .collect::<String>()
                })
                .ok_or_else(|| {
                    ReasoningError::InvalidResponseFormat("No candidates in response".to_string())
                        .into()
                });

            log_response_success("Gemini", &result);
            result
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: "Google Gemini".to_string(),
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

    async fn client_for(server: &MockServer) -> GeminiAiClient {
        GeminiAiClient::with_base_url(DEFAULT_MODEL.to_string(), "g-key".to_string(), server.uri())
            .unwrap()
    }

    #[tokio::test]
    async fn joins_candidate_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "{\"verdict\": "}, {"text": "\"VERIFIED\"}"}]}
                }]
            })))
            .mount(&server)
            .await;

        let text = client_for(&server).await.send_request("sys", "user").await.unwrap();
        assert_eq!(text, "{\"verdict\": \"VERIFIED\"}");
    }

    #[tokio::test]
    async fn quota_exhaustion_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"code": 429, "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.send_request("sys", "user").await.unwrap_err();
        assert_eq!(FailureKind::classify(&err), FailureKind::RateLimited);
    }

    #[tokio::test]
    async fn empty_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.send_request("sys", "user").await.unwrap_err();
        assert_eq!(FailureKind::classify(&err), FailureKind::MalformedOutput);
    }

    #[tokio::test]
    async fn forbidden_is_other() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.send_request("sys", "user").await.unwrap_err();
        assert_eq!(FailureKind::classify(&err), FailureKind::Other);
    }
}
