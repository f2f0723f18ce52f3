//! Resolution of the AI provider configuration.

use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::reasoning::ai::claude::{self, ClaudeAiClient};
use crate::reasoning::ai::gemini::{self, GeminiAiClient};
use crate::reasoning::ai::AiClient;
use crate::reasoning::disproval::{DisprovalLoop, DEFAULT_STEP_TIMEOUT};
use crate::reasoning::error::ReasoningError;
use crate::utils::Settings;

/// Forces a provider (`claude`, `gemini`) or disables AI (`none`).
pub const PROVIDER_ENV: &str = "CONTRIB_TRUTH_PROVIDER";
/// Per-request deadline in seconds.
pub const TIMEOUT_ENV: &str = "CONTRIB_TRUTH_AI_TIMEOUT_SECS";

const GEMINI_KEY_ENVS: &[&str] = &["GEMINI_API_KEY"];
const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";
const CLAUDE_KEY_ENVS: &[&str] = &["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"];
const CLAUDE_MODEL_ENV: &str = "ANTHROPIC_MODEL";

/// Supported AI providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Anthropic Messages API.
    Claude,
    /// Google Gemini API.
    Gemini,
}

impl Provider {
    fn key_envs(self) -> &'static [&'static str] {
        match self {
            Self::Claude => CLAUDE_KEY_ENVS,
            Self::Gemini => GEMINI_KEY_ENVS,
        }
    }

    fn model_env(self) -> &'static str {
        match self {
            Self::Claude => CLAUDE_MODEL_ENV,
            Self::Gemini => GEMINI_MODEL_ENV,
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Self::Claude => claude::DEFAULT_MODEL,
            Self::Gemini => gemini::DEFAULT_MODEL,
        }
    }
}

/// Resolved settings for the disproval loop. The key is never serialized.
#[derive(Clone, Serialize)]
pub struct ReasoningConfig {
    provider: Provider,
    model: String,
    #[serde(skip)]
    api_key: String,
    step_timeout_secs: u64,
}

impl fmt::Debug for ReasoningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReasoningConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("step_timeout_secs", &self.step_timeout_secs)
            .finish()
    }
}

impl ReasoningConfig {
    /// Resolves from the environment and `~/.contrib-truth/settings.json`.
    ///
    /// `Ok(None)` means no provider is configured and only the heuristic runs.
    pub fn resolve() -> Result<Option<Self>> {
        let settings = Settings::load().context("Failed to load settings")?;
        Self::resolve_with(&settings)
    }

    /// Resolves from already-loaded settings.
    pub fn resolve_with(settings: &Settings) -> Result<Option<Self>> {
        Self::from_lookup(|key| settings.get_first_env_var(&[key]))
    }

    /// Resolves using `lookup` for every variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|&k| lookup(k));

        let forced = lookup(PROVIDER_ENV).map(|p| p.trim().to_ascii_lowercase());
        let (provider, api_key) = match forced.as_deref() {
            Some("none" | "off" | "heuristic") => {
                debug!("AI reasoning disabled by {PROVIDER_ENV}");
                return Ok(None);
            }
            Some(name) => {
                let provider = match name {
                    "claude" | "anthropic" => Provider::Claude,
                    "gemini" | "google" => Provider::Gemini,
                    other => bail!("Unknown {PROVIDER_ENV} value: {other:?}"),
                };
                let key = first(provider.key_envs())
                    .ok_or(ReasoningError::ApiKeyNotFound)
                    .with_context(|| format!("{PROVIDER_ENV}={name} requires an API key"))?;
                (provider, key)
            }
            None => {
                if let Some(key) = first(GEMINI_KEY_ENVS) {
                    (Provider::Gemini, key)
                } else if let Some(key) = first(CLAUDE_KEY_ENVS) {
                    (Provider::Claude, key)
                } else {
                    debug!("No AI provider key configured");
                    return Ok(None);
                }
            }
        };

        let model = lookup(provider.model_env())
            .unwrap_or_else(|| provider.default_model().to_string());

        let step_timeout_secs = match lookup(TIMEOUT_ENV) {
            Some(raw) => parse_timeout_secs(&raw)
                .with_context(|| format!("Invalid {TIMEOUT_ENV} value: {raw:?}"))?,
            None => DEFAULT_STEP_TIMEOUT.as_secs(),
        };

        debug!(provider = ?provider, model = %model, step_timeout_secs, "Resolved AI configuration");
        Ok(Some(Self {
            provider,
            model,
            api_key,
            step_timeout_secs,
        }))
    }

    /// Overrides the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the per-request deadline.
    #[must_use]
    pub fn with_step_timeout_secs(mut self, secs: u64) -> Self {
        self.step_timeout_secs = secs.max(1);
        self
    }

    /// Selected provider.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Model identifier sent to the provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Timeout applied to each disproval step.
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    /// Builds the HTTP client for the configured provider.
    pub fn create_client(&self) -> Result<Box<dyn AiClient>> {
        Ok(match self.provider {
            Provider::Claude => Box::new(ClaudeAiClient::new(
                self.model.clone(),
                self.api_key.clone(),
            )?),
            Provider::Gemini => Box::new(GeminiAiClient::new(
                self.model.clone(),
                self.api_key.clone(),
            )?),
        })
    }

    /// Builds a disproval loop over the configured provider.
    pub fn build_disproval_loop(&self) -> Result<DisprovalLoop> {
        Ok(DisprovalLoop::new(self.create_client()?).with_step_timeout(self.step_timeout()))
    }
}

fn parse_timeout_secs(raw: &str) -> Result<u64> {
    let secs: u64 = raw.trim().parse().context("not a whole number of seconds")?;
    if secs == 0 {
        bail!("timeout must be at least one second");
    }
    Ok(secs)
}
