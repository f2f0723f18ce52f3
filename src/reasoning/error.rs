//! Errors raised on the external reasoning path.

use thiserror::Error;

/// Errors from AI providers and from interpreting their output.
#[derive(Error, Debug)]
pub enum ReasoningError {
    /// No API key configured for the selected provider.
    #[error("AI API key not found. Set GEMINI_API_KEY, CLAUDE_API_KEY or ANTHROPIC_API_KEY")]
    ApiKeyNotFound,

    /// Provider answered with a non-success status.
    #[error("AI API request failed: {0}")]
    ApiRequestFailed(String),

    /// Provider body could not be decoded.
    #[error("Invalid response format from AI API: {0}")]
    InvalidResponseFormat(String),

    /// Provider rejected the request with HTTP 429.
    #[error("Rate limit exceeded. Please try again later")]
    RateLimitExceeded,

    /// Transport failure.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A request did not complete within its time budget.
    #[error("AI request timed out: {0}")]
    Timeout(String),

    /// The model answered, but not with something usable.
    #[error("Malformed model output in {step} step: {detail}")]
    MalformedOutput {
        /// Step that produced the output.
        step: &'static str,
        /// What was wrong with it.
        detail: String,
    },
}

/// Coarse failure class driving the fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Deadline exceeded.
    Timeout,
    /// Provider throttled the request.
    RateLimited,
    /// Output could not be interpreted.
    MalformedOutput,
    /// Anything else.
    Other,
}

impl ReasoningError {
    /// Failure class of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout(_) => FailureKind::Timeout,
            Self::RateLimitExceeded => FailureKind::RateLimited,
            Self::MalformedOutput { .. } | Self::InvalidResponseFormat(_) => {
                FailureKind::MalformedOutput
            }
            Self::ApiKeyNotFound | Self::ApiRequestFailed(_) | Self::NetworkError(_) => {
                FailureKind::Other
            }
        }
    }
}

impl FailureKind {
    /// Classifies an error by the first [`ReasoningError`] in its chain.
    pub fn classify(err: &anyhow::Error) -> Self {
        err.chain()
            .find_map(|cause| cause.downcast_ref::<ReasoningError>())
            .map_or(Self::Other, ReasoningError::kind)
    }
}
