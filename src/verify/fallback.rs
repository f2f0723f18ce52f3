//! What the user is told when the AI path fails.

use std::collections::HashMap;

use crate::reasoning::FailureKind;

/// Note shown when the provider throttled us.
pub const RATE_LIMIT_NOTE: &str =
    "AI provider rate limited; please wait 30 seconds and retry for AI analysis.";

/// Disclosure attached to a heuristic verdict produced after a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackNote {
    /// Fall back without comment.
    Silent,
    /// Add this text to the explanation, ahead of the offline disclosure.
    WithNote(String),
}

/// Maps each [`FailureKind`] to a [`FallbackNote`]. Unlisted kinds are silent.
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    notes: HashMap<FailureKind, FallbackNote>,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::silent().with_note(FailureKind::RateLimited, RATE_LIMIT_NOTE)
    }
}

impl FallbackPolicy {
    /// A policy that never adds a note.
    pub fn silent() -> Self {
        Self {
            notes: HashMap::new(),
        }
    }

    /// Attaches `note` to failures of `kind`.
    #[must_use]
    pub fn with_note(mut self, kind: FailureKind, note: impl Into<String>) -> Self {
        self.notes.insert(kind, FallbackNote::WithNote(note.into()));
        self
    }

    /// Falls back silently on failures of `kind`.
    #[must_use]
    pub fn with_silent(mut self, kind: FailureKind) -> Self {
        self.notes.insert(kind, FallbackNote::Silent);
        self
    }

    /// Note for a failure of `kind`.
    pub fn note_for(&self, kind: FailureKind) -> &FallbackNote {
        self.notes.get(&kind).unwrap_or(&FallbackNote::Silent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_only_notes_rate_limits() {
        let policy = FallbackPolicy::default();
        assert_eq!(
            policy.note_for(FailureKind::RateLimited),
            &FallbackNote::WithNote(RATE_LIMIT_NOTE.to_string())
        );
        for kind in [FailureKind::Timeout, FailureKind::MalformedOutput, FailureKind::Other] {
            assert_eq!(policy.note_for(kind), &FallbackNote::Silent);
        }
    }

    #[test]
    fn overrides() {
        let policy = FallbackPolicy::default()
            .with_silent(FailureKind::RateLimited)
            .with_note(FailureKind::Timeout, "AI timed out.");
        assert_eq!(policy.note_for(FailureKind::RateLimited), &FallbackNote::Silent);
        assert_eq!(
            policy.note_for(FailureKind::Timeout),
            &FallbackNote::WithNote("AI timed out.".to_string())
        );
    }
}
