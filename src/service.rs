//! Transport-agnostic upload, verify, status and clear operations.
//!
//! A [`ContributionService`] owns one [`EvidenceSession`]; whatever sits in
//! front of it (the CLI here) maps requests onto these four calls.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::data::{EvidenceSession, EvidenceStore, Verdict};
use crate::git::GitHistoryParser;
use crate::transcript::{TranscriptParser, DEFAULT_TITLE};
use crate::verify::ClaimVerifier;

/// Which upload payload an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Commit history text or JSON.
    History,
    /// Meeting transcript text.
    Transcript,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::History => "Commit history",
            Self::Transcript => "Transcript",
        })
    }
}

/// Request-level failures. Nothing is changed when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Upload carried neither a history nor a transcript.
    #[error("No evidence provided. Upload a commit history, a transcript, or both")]
    NoPayload,

    /// Payload bytes are not UTF-8.
    #[error("{0} payload is not valid UTF-8")]
    InvalidUtf8(PayloadKind),

    /// Payload is empty or whitespace.
    #[error("{0} payload is empty")]
    BlankPayload(PayloadKind),

    /// Verification requested before any upload.
    #[error("No evidence uploaded. Upload evidence before verifying claims")]
    NoEvidence,

    /// Claimant name missing.
    #[error("Claimant must not be blank")]
    BlankClaimant,

    /// Claim text missing.
    #[error("Claim must not be blank")]
    BlankClaim,
}

/// One transcript upload.
#[derive(Debug, Clone)]
pub struct TranscriptPayload {
    /// Title shown in the rendered context.
    pub title: String,
    /// Raw bytes.
    pub content: Vec<u8>,
}

/// Raw evidence for one upload.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// Commit history bytes.
    pub history: Option<Vec<u8>>,
    /// Transcript payloads, in order.
    pub transcripts: Vec<TranscriptPayload>,
}

impl UploadRequest {
    /// An empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches raw commit history.
    #[must_use]
    pub fn with_history(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.history = Some(content.into());
        self
    }

    /// Adds a transcript; a blank title becomes the default title.
    #[must_use]
    pub fn with_transcript(mut self, title: Option<String>, content: impl Into<Vec<u8>>) -> Self {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        self.transcripts.push(TranscriptPayload {
            title,
            content: content.into(),
        });
        self
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    /// Commits in the installed history.
    pub git_commits_parsed: usize,
    /// Statements across all installed transcripts.
    pub transcript_statements_parsed: usize,
    /// Sorted union of commit authors and speakers.
    pub contributors_found: Vec<String>,
}

/// Read-only view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceStatus {
    /// Whether a snapshot is installed.
    pub has_evidence: bool,
    /// Commits in the snapshot.
    pub commit_count: usize,
    /// Transcript statements in the snapshot.
    pub statement_count: usize,
    /// Sorted union of commit authors and speakers.
    pub contributors: Vec<String>,
    /// Whether an AI provider is configured.
    pub ai_configured: bool,
    /// Configured provider and model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<String>,
}

/// The four session operations.
pub struct ContributionService {
    session: EvidenceSession,
    verifier: ClaimVerifier,
}

impl ContributionService {
    /// A service with no evidence loaded.
    pub fn new(verifier: ClaimVerifier) -> Self {
        Self {
            session: EvidenceSession::new(),
            verifier,
        }
    }

    /// Parses the payloads and replaces the session snapshot with them.
    pub fn upload(&self, request: UploadRequest) -> Result<UploadSummary, ServiceError> {
        if request.history.is_none() && request.transcripts.is_empty() {
            return Err(ServiceError::NoPayload);
        }

        let history = request
            .history
            .as_deref()
            .map(|bytes| decode_payload(bytes, PayloadKind::History))
            .transpose()?
            .map(GitHistoryParser::parse);

        let mut transcripts = Vec::with_capacity(request.transcripts.len());
        for payload in &request.transcripts {
            let text = decode_payload(&payload.content, PayloadKind::Transcript)?;
            transcripts.push(TranscriptParser::parse(text, &payload.title));
        }

        if history.as_ref().is_some_and(|h| h.is_empty()) {
            warn!("Commit history payload produced no commits");
        }
        if !transcripts.is_empty() && transcripts.iter().all(|t| t.statements().is_empty()) {
            warn!("Transcript payload produced no statements");
        }

        Ok(self.install(EvidenceStore::new(history, transcripts)))
    }

    /// Replaces the snapshot with an already-built store.
    pub fn install(&self, store: EvidenceStore) -> UploadSummary {
        let summary = UploadSummary {
            git_commits_parsed: store.commit_count(),
            transcript_statements_parsed: store.statement_count(),
            contributors_found: store.all_contributors(),
        };
        info!(
            commits = summary.git_commits_parsed,
            statements = summary.transcript_statements_parsed,
            contributors = summary.contributors_found.len(),
            "Evidence uploaded"
        );
        self.session.replace(store);
        summary
    }

    /// Verifies a claim against the current snapshot.
    pub async fn verify(&self, claimant: &str, claim: &str) -> Result<Verdict, ServiceError> {
        let store = self.session.snapshot().ok_or(ServiceError::NoEvidence)?;
        let claimant = claimant.trim();
        let claim = claim.trim();
        if claimant.is_empty() {
            return Err(ServiceError::BlankClaimant);
        }
        if claim.is_empty() {
            return Err(ServiceError::BlankClaim);
        }
        Ok(self.verifier.verify(claimant, claim, &store).await)
    }

    /// Describes the current snapshot and AI configuration.
    pub fn status(&self) -> EvidenceStatus {
        let snapshot = self.session.snapshot();
        EvidenceStatus {
            has_evidence: snapshot.is_some(),
            commit_count: snapshot.as_ref().map_or(0, |s| s.commit_count()),
            statement_count: snapshot.as_ref().map_or(0, |s| s.statement_count()),
            contributors: snapshot
                .as_ref()
                .map(|s| s.all_contributors())
                .unwrap_or_default(),
            ai_configured: self.verifier.has_reasoning(),
            ai_provider: self.verifier.reasoning_metadata().map(|m| m.provider),
        }
    }

    /// Discards the snapshot. Returns whether there was one.
    pub fn clear(&self) -> bool {
        let cleared = self.session.clear();
        info!(cleared, "Evidence cleared");
        cleared
    }
}

fn decode_payload(bytes: &[u8], kind: PayloadKind) -> Result<&str, ServiceError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ServiceError::InvalidUtf8(kind))?;
    if text.trim().is_empty() {
        return Err(ServiceError::BlankPayload(kind));
    }
    Ok(text)
}
