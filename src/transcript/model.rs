//! Normalized meeting transcript model.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

/// Title used when the caller does not supply one.
pub const DEFAULT_TITLE: &str = "Meeting";

/// One attributed statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Normalized speaker name.
    pub speaker: String,
    /// Statement text, continuation lines joined by single spaces.
    pub content: String,
    /// Raw timestamp token (`10:02`, `10:02:30`) when the line carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// 1-based line on which the statement began.
    pub line_number: usize,
}

/// Parsed meeting transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    statements: Vec<Statement>,
}

/// Participation statistics for one speaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpeakerSummary {
    /// Statements attributed to the speaker.
    pub statement_count: usize,
    /// Whitespace-separated words across those statements.
    pub total_words: usize,
}

impl Transcript {
    /// Builds a transcript from already-normalized statements.
    pub fn new(title: impl Into<String>, date: Option<NaiveDate>, statements: Vec<Statement>) -> Self {
        Self {
            title: title.into(),
            date,
            statements,
        }
    }

    /// Transcript title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Meeting date found near the top of the transcript.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Statements in source order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Sorted, de-duplicated speaker names.
    pub fn participants(&self) -> Vec<String> {
        self.statements
            .iter()
            .map(|s| s.speaker.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Statements whose content mentions `name`, ignoring case.
    pub fn mentions_of(&self, name: &str) -> Vec<&Statement> {
        let needle = name.to_lowercase();
        if needle.trim().is_empty() {
            return Vec::new();
        }
        self.statements
            .iter()
            .filter(|s| s.content.to_lowercase().contains(&needle))
            .collect()
    }

    /// Per-speaker statement and word counts, keyed by speaker.
    pub fn speaker_summary(&self) -> BTreeMap<String, SpeakerSummary> {
        let mut summary: BTreeMap<String, SpeakerSummary> = BTreeMap::new();
        for statement in &self.statements {
            let entry = summary.entry(statement.speaker.clone()).or_default();
            entry.statement_count += 1;
            entry.total_words += statement.content.split_whitespace().count();
        }
        summary
    }
}
