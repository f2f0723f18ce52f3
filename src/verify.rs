//! Claim verification: AI disproval with a heuristic safety net.

pub mod fallback;
pub mod heuristic;

use tracing::{info, warn};

pub use fallback::{FallbackNote, FallbackPolicy, RATE_LIMIT_NOTE};
pub use heuristic::{HeuristicVerdictEngine, HEURISTIC_SOURCE, OFFLINE_DISCLOSURE};

use crate::data::{EvidenceStore, Verdict};
use crate::reasoning::{AiClientMetadata, DisprovalLoop, FailureKind};

/// Produces a verdict for every claim, whatever happens upstream.
///
/// With a [`DisprovalLoop`] configured the AI verdict is preferred; any
/// failure yields the heuristic verdict instead, annotated according to
/// the [`FallbackPolicy`]. Results from a failed run are never mixed in.
pub struct ClaimVerifier {
    reasoning: Option<DisprovalLoop>,
    policy: FallbackPolicy,
}

impl ClaimVerifier {
    /// A verifier that only runs the heuristic.
    pub fn heuristic_only() -> Self {
        Self {
            reasoning: None,
            policy: FallbackPolicy::default(),
        }
    }

    /// A verifier that tries `reasoning` first.
    pub fn with_reasoning(reasoning: DisprovalLoop) -> Self {
        Self {
            reasoning: Some(reasoning),
            policy: FallbackPolicy::default(),
        }
    }

    /// Replaces the fallback policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether an AI provider is configured.
    pub fn has_reasoning(&self) -> bool {
        self.reasoning.is_some()
    }

    /// Provider and model of the AI loop, if any.
    pub fn reasoning_metadata(&self) -> Option<AiClientMetadata> {
        self.reasoning.as_ref().map(DisprovalLoop::metadata)
    }

    /// Verifies `claim` by `claimant` against `store`.
    pub async fn verify(&self, claimant: &str, claim: &str, store: &EvidenceStore) -> Verdict {
        let context = store.render_context();

        let Some(reasoning) = &self.reasoning else {
            return HeuristicVerdictEngine::evaluate(claimant, claim, &context);
        };

        match reasoning.run(claimant, claim, &context).await {
            Ok(verdict) => {
                info!(claimant, verdict = ?verdict.kind(), "AI verdict");
                verdict
            }
            Err(err) => {
                let kind = FailureKind::classify(&err);
                warn!(claimant, failure = ?kind, error = %format!("{err:#}"), "AI analysis failed, using heuristic");
                let note = match self.policy.note_for(kind) {
                    FallbackNote::Silent => None,
                    FallbackNote::WithNote(note) => Some(note.as_str()),
                };
                HeuristicVerdictEngine::evaluate_with_note(claimant, claim, &context, note)
            }
        }
    }
}
