//! Deterministic, fully local verdicts from pattern counts.

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::data::{Evidence, EvidenceKind, EvidenceStrength, Verdict, VerdictKind};

/// Source label on every heuristic evidence item.
pub const HEURISTIC_SOURCE: &str = "heuristic";

/// Suffix on every heuristic explanation.
pub const OFFLINE_DISCLOSURE: &str =
    "(Heuristic mode - configure GEMINI_API_KEY or ANTHROPIC_API_KEY for AI-powered analysis)";

/// Mentions needed, alongside commit matches, for a verified verdict.
const VERIFIED_MENTION_THRESHOLD: usize = 5;
/// Commit matches above which commit evidence counts as moderate.
const MODERATE_COMMIT_THRESHOLD: usize = 2;

/// Pattern-count verdict engine. Pure and infallible.
pub struct HeuristicVerdictEngine;

impl HeuristicVerdictEngine {
    /// Judges `claim` by how often `claimant` appears in `context`.
    ///
    /// `context` is the rendered evidence text; commit lines look like
    /// `[abc1234] Name (...)` and statements like `[L3] Name: ...`.
    pub fn evaluate(claimant: &str, claim: &str, context: &str) -> Verdict {
        Self::evaluate_with_note(claimant, claim, context, None)
    }

    /// Like [`Self::evaluate`], with `note` placed just before the
    /// offline disclosure so the explanation still ends with it.
    pub fn evaluate_with_note(
        claimant: &str,
        claim: &str,
        context: &str,
        note: Option<&str>,
    ) -> Verdict {
        let mentions = mention_count(context, claimant);
        let commit_matches = tagged_match_count(context, claimant, "");
        let statement_matches = tagged_match_count(context, claimant, ":");

        debug!(
            claimant,
            mentions, commit_matches, statement_matches, "Heuristic evaluation"
        );

        let mut supporting = Vec::new();
        let mut counter = Vec::new();
        let mut missing = Vec::new();

        if commit_matches > 0 {
            let strength = if commit_matches > MODERATE_COMMIT_THRESHOLD {
                EvidenceStrength::Moderate
            } else {
                EvidenceStrength::Weak
            };
            supporting.push(Evidence::new(
                EvidenceKind::GitCommit,
                HEURISTIC_SOURCE,
                format!("Found {commit_matches} commits by {claimant}"),
                strength,
            ));
        } else {
            missing.push(format!("No commits found from {claimant}"));
        }

        if statement_matches > 0 {
            supporting.push(Evidence::new(
                EvidenceKind::MeetingTranscript,
                HEURISTIC_SOURCE,
                format!("Found {statement_matches} statements by {claimant}"),
                EvidenceStrength::Moderate,
            ));
        }

        let (kind, confidence, explanation) =
            if mentions > VERIFIED_MENTION_THRESHOLD && commit_matches > 0 {
                (
                    VerdictKind::Verified,
                    (0.7 + 0.02 * mentions as f64).min(0.95),
                    format!(
                        "Heuristic analysis found {mentions} mentions of {claimant} in the evidence, \
                         including {commit_matches} commits. This suggests active involvement."
                    ),
                )
            } else if mentions > 0 {
                (
                    VerdictKind::Unverifiable,
                    0.4,
                    format!(
                        "Limited evidence found for {claimant}'s claim. Found {mentions} mentions \
                         but not enough to confirm specific contributions."
                    ),
                )
            } else {
                counter.push(Evidence::new(
                    EvidenceKind::GitCommit,
                    HEURISTIC_SOURCE,
                    format!("No activity found for {claimant}"),
                    EvidenceStrength::Strong,
                ));
                (
                    VerdictKind::Disputed,
                    0.6,
                    format!(
                        "No evidence found linking {claimant} to the claimed work. \
                         Zero mentions in commit history or meeting transcripts."
                    ),
                )
            };

        Verdict::new(
            claimant,
            claim,
            kind,
            confidence,
            compose_explanation(&explanation, note),
        )
        .with_supporting(supporting)
        .with_counter(counter)
        .with_missing(missing)
    }
}

fn compose_explanation(explanation: &str, note: Option<&str>) -> String {
    match note.map(str::trim).filter(|n| !n.is_empty()) {
        Some(note) => format!("{explanation} {note} {OFFLINE_DISCLOSURE}"),
        None => format!("{explanation} {OFFLINE_DISCLOSURE}"),
    }
}

/// Case-insensitive, non-overlapping occurrences of `claimant`.
fn mention_count(context: &str, claimant: &str) -> usize {
    if claimant.trim().is_empty() {
        return 0;
    }
    context
        .to_lowercase()
        .matches(claimant.to_lowercase().as_str())
        .count()
}

/// Counts `[tag] <claimant><suffix>` occurrences, ignoring case.
fn tagged_match_count(context: &str, claimant: &str, suffix: &str) -> usize {
    if claimant.trim().is_empty() {
        return 0;
    }
    match tagged_pattern(claimant, suffix) {
        Ok(pattern) => pattern.find_iter(context).count(),
        Err(e) => {
            warn!(claimant, error = %e, "Claimant pattern failed to compile, counting no matches");
            0
        }
    }
}

fn tagged_pattern(claimant: &str, suffix: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(
        r"\[\w+\]\s*{}{}",
        regex::escape(claimant),
        regex::escape(suffix)
    ))
    .case_insensitive(true)
    .build()
}
