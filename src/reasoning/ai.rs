//! AI client trait and shared HTTP helpers.

pub mod claude;
pub mod gemini;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};

use crate::reasoning::error::ReasoningError;

/// Upper bound on a single HTTP exchange.
///
/// Each disproval step carries its own, usually shorter, deadline; this
/// only stops a stalled connection from outliving the process.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Output token cap requested from every provider.
pub(crate) const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Metadata about an AI client implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AiClientMetadata {
    /// Service provider name.
    pub provider: String,
    /// Model identifier.
    pub model: String,
}

/// Builds an HTTP client with the standard request timeout.
pub(crate) fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Maps a transport failure to a [`ReasoningError`].
pub(crate) fn transport_error(err: &reqwest::Error) -> ReasoningError {
    if err.is_timeout() {
        ReasoningError::Timeout(err.to_string())
    } else {
        ReasoningError::NetworkError(err.to_string())
    }
}

/// Passes successful responses through; turns error statuses into
/// [`ReasoningError`]s, with 429 reported as rate limiting.
pub(crate) async fn check_error_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ReasoningError::RateLimitExceeded.into());
    }
    let error_text = response.text().await.unwrap_or_else(|e| {
        tracing::debug!("Failed to read error response body: {e}");
        String::new()
    });
    Err(ReasoningError::ApiRequestFailed(format!("HTTP {status}: {error_text}")).into())
}

/// Logs successful text extraction from an AI API response.
pub(crate) fn log_response_success(provider: &str, result: &Result<String>) {
    if let Ok(text) = result {
        tracing::debug!(
            response_len = text.len(),
            "Successfully extracted text content from {} API response",
            provider
        );
        tracing::trace!(response_content = %text, "{} API response content", provider);
    }
}

/// Trait for AI service clients.
pub trait AiClient: Send + Sync {
    /// Sends a request to the AI service and returns the raw response text.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Returns metadata about the AI client implementation.
    fn get_metadata(&self) -> AiClientMetadata;
}
