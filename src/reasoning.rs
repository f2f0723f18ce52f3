//! External reasoning: AI providers and the disproval loop built on them.

pub mod ai;
pub mod config;
pub mod disproval;
pub mod error;
pub mod json_span;
pub mod prompts;

#[cfg(test)]
pub(crate) mod test_utils;

pub use ai::{AiClient, AiClientMetadata};
pub use config::{Provider, ReasoningConfig};
pub use disproval::{DisprovalLoop, Step, DEFAULT_STEP_TIMEOUT};
pub use error::{FailureKind, ReasoningError};
