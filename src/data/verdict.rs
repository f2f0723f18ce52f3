//! Evidence and verdict model shared by the heuristic and AI paths.

use serde::Serialize;

/// Which evidence source an item was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    /// A commit in the history.
    GitCommit,
    /// A statement in a meeting transcript.
    MeetingTranscript,
}

impl EvidenceKind {
    /// Parses a wire label (`git_commit`, `meeting_transcript`), ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "git_commit" | "commit" => Some(Self::GitCommit),
            "meeting_transcript" | "transcript" | "statement" => Some(Self::MeetingTranscript),
            _ => None,
        }
    }
}

/// How strongly an evidence item bears on the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceStrength {
    /// Direct, specific evidence.
    Strong,
    /// Relevant but indirect.
    Moderate,
    /// Circumstantial.
    Weak,
}

impl EvidenceStrength {
    /// Parses `strong`, `moderate` or `weak`, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "strong" => Some(Self::Strong),
            "moderate" => Some(Self::Moderate),
            "weak" => Some(Self::Weak),
            _ => None,
        }
    }

    /// Lower-case label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
        }
    }
}

/// One piece of evidence for or against a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evidence {
    /// Source kind.
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    /// Commit hash, transcript line reference, or `heuristic`.
    pub source: String,
    /// What the evidence shows.
    pub summary: String,
    /// Evidence strength.
    pub strength: EvidenceStrength,
}

impl Evidence {
    /// Creates an evidence item.
    pub fn new(
        kind: EvidenceKind,
        source: impl Into<String>,
        summary: impl Into<String>,
        strength: EvidenceStrength,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            summary: summary.into(),
            strength,
        }
    }
}

/// Outcome category of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictKind {
    /// Evidence supports the claim.
    Verified,
    /// Evidence contradicts the claim.
    Disputed,
    /// Not enough evidence either way.
    Unverifiable,
}

impl VerdictKind {
    /// Parses `VERIFIED`, `DISPUTED` or `UNVERIFIABLE`, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "VERIFIED" => Some(Self::Verified),
            "DISPUTED" => Some(Self::Disputed),
            "UNVERIFIABLE" => Some(Self::Unverifiable),
            _ => None,
        }
    }
}

/// Final judgement on a contribution claim.
///
/// Confidence is kept in `[0, 1]` by construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    claim: String,
    claimant: String,
    #[serde(rename = "verdict")]
    kind: VerdictKind,
    confidence: f64,
    explanation: String,
    supporting_evidence: Vec<Evidence>,
    counter_evidence: Vec<Evidence>,
    missing_evidence: Vec<String>,
}

impl Verdict {
    /// Creates a verdict with no evidence attached.
    ///
    /// Confidence is clamped into `[0, 1]`; a non-finite value becomes 0.
    pub fn new(
        claimant: impl Into<String>,
        claim: impl Into<String>,
        kind: VerdictKind,
        confidence: f64,
        explanation: impl Into<String>,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            claim: claim.into(),
            claimant: claimant.into(),
            kind,
            confidence,
            explanation: explanation.into(),
            supporting_evidence: Vec::new(),
            counter_evidence: Vec::new(),
            missing_evidence: Vec::new(),
        }
    }

    /// Attaches supporting evidence.
    pub fn with_supporting(mut self, evidence: Vec<Evidence>) -> Self {
        self.supporting_evidence = evidence;
        self
    }

    /// Attaches counter evidence.
    pub fn with_counter(mut self, evidence: Vec<Evidence>) -> Self {
        self.counter_evidence = evidence;
        self
    }

    /// Attaches descriptions of expected but absent evidence.
    pub fn with_missing(mut self, missing: Vec<String>) -> Self {
        self.missing_evidence = missing;
        self
    }

    /// The claim as submitted.
    pub fn claim(&self) -> &str {
        &self.claim
    }

    /// Who made the claim.
    pub fn claimant(&self) -> &str {
        &self.claimant
    }

    /// Verdict label.
    pub fn kind(&self) -> VerdictKind {
        self.kind
    }

    /// Confidence in `[0.0, 1.0]`.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Human-readable reasoning, including any appended notes.
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Evidence for the claim.
    pub fn supporting_evidence(&self) -> &[Evidence] {
        &self.supporting_evidence
    }

    /// Evidence against the claim.
    pub fn counter_evidence(&self) -> &[Evidence] {
        &self.counter_evidence
    }

    /// Expected evidence that was not found.
    pub fn missing_evidence(&self) -> &[String] {
        &self.missing_evidence
    }
}
