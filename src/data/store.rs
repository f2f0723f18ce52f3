//! Immutable evidence snapshot and its flattened text rendering.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::git::GitHistory;
use crate::transcript::Transcript;

/// Header preceding the commit section of the rendered context.
const COMMIT_LOG_HEADER: &str = "=== GIT COMMIT LOG ===";

/// One upload's worth of evidence: an optional history plus transcripts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvidenceStore {
    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<GitHistory>,
    transcripts: Vec<Transcript>,
}

impl EvidenceStore {
    /// Creates a snapshot.
    pub fn new(history: Option<GitHistory>, transcripts: Vec<Transcript>) -> Self {
        Self {
            history,
            transcripts,
        }
    }

    /// Commit history, when one was supplied.
    pub fn history(&self) -> Option<&GitHistory> {
        self.history.as_ref()
    }

    /// Transcripts in upload order.
    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    /// Number of commits in the history, 0 when absent.
    pub fn commit_count(&self) -> usize {
        self.history.as_ref().map_or(0, GitHistory::len)
    }

    /// Number of statements across all transcripts.
    pub fn statement_count(&self) -> usize {
        self.transcripts.iter().map(|t| t.statements().len()).sum()
    }

    /// Sorted, de-duplicated union of commit authors and transcript speakers.
    ///
    /// Comparison is case-sensitive.
    pub fn all_contributors(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        if let Some(history) = &self.history {
            names.extend(history.contributors());
        }
        for transcript in &self.transcripts {
            names.extend(transcript.participants());
        }
        names.into_iter().collect()
    }

    /// Flattens the snapshot into the text searched by verification.
    ///
    /// Output is a pure function of the snapshot.
    pub fn render_context(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(history) = self.history.as_ref().filter(|h| !h.is_empty()) {
            parts.push(COMMIT_LOG_HEADER.to_string());
            for commit in history.commits() {
                let files = if commit.files().is_empty() {
                    "N/A".to_string()
                } else {
                    commit
                        .files()
                        .iter()
                        .map(|f| f.filename.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                parts.push(format!(
                    "[{}] {} ({}): {}\n  Files: {}",
                    commit.short_hash(),
                    commit.author_name(),
                    commit.timestamp().format("%Y-%m-%d"),
                    commit.message(),
                    files
                ));
            }
        }

        for (idx, transcript) in self.transcripts.iter().enumerate() {
            parts.push(format!(
                "\n=== MEETING TRANSCRIPT {}: {} ===",
                idx + 1,
                transcript.title()
            ));
            for statement in transcript.statements() {
                parts.push(format!(
                    "[L{}] {}: {}",
                    statement.line_number, statement.speaker, statement.content
                ));
            }
        }

        parts.join("\n")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::git::{Commit, FileChange};
    use crate::transcript::Statement;
    use chrono::DateTime;

    fn commit(hash: &str, author: &str, message: &str, files: &[&str]) -> Commit {
        let ts = DateTime::parse_from_rfc3339("2024-01-15T10:30:00+00:00").unwrap();
        Commit::new(hash, author, None, ts, message)
            .with_files(files.iter().map(|f| FileChange::named(*f)).collect())
    }

    fn statement(line: usize, speaker: &str, content: &str) -> Statement {
        Statement {
            speaker: speaker.to_string(),
            content: content.to_string(),
            timestamp: None,
            line_number: line,
        }
    }

    fn sample() -> EvidenceStore {
        let history = GitHistory::new(vec![
            commit("abc1234def", "Alice Chen", "Add login", &["src/auth.rs", "src/lib.rs"]),
            commit("0123456789", "Bob", "Fix typo", &[]),
        ]);
        let transcript = Transcript::new(
            "standup.txt",
            None,
            vec![
                statement(3, "Alice Chen", "I built the login flow"),
                statement(4, "Carol", "Nice"),
            ],
        );
        EvidenceStore::new(Some(history), vec![transcript])
    }

    #[test]
    fn renders_commits_then_transcripts() {
        let expected = "=== GIT COMMIT LOG ===\n\
                        [abc1234] Alice Chen (2024-01-15): Add login\n  Files: src/auth.rs, src/lib.rs\n\
                        [0123456] Bob (2024-01-15): Fix typo\n  Files: N/A\n\
                        \n=== MEETING TRANSCRIPT 1: standup.txt ===\n\
                        [L3] Alice Chen: I built the login flow\n\
                        [L4] Carol: Nice";
        assert_eq!(sample().render_context(), expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let store = sample();
        assert_eq!(store.render_context(), store.render_context());
    }

    #[test]
    fn empty_store_renders_nothing() {
        let store = EvidenceStore::default();
        assert_eq!(store.render_context(), "");
        assert_eq!(store.commit_count(), 0);
        assert_eq!(store.statement_count(), 0);
        assert!(store.all_contributors().is_empty());
    }

    #[test]
    fn empty_history_has_no_commit_log_header() {
        let store = EvidenceStore::new(
            Some(GitHistory::new(Vec::new())),
            vec![Transcript::new("m", None, vec![statement(1, "Bob", "hi")])],
        );
        assert_eq!(
            store.render_context(),
            "\n=== MEETING TRANSCRIPT 1: m ===\n[L1] Bob: hi"
        );
    }

    #[test]
    fn contributors_union_is_sorted_and_case_sensitive() {
        let store = EvidenceStore::new(
            Some(GitHistory::new(vec![commit("aaaaaaa", "bob", "x", &[])])),
            vec![Transcript::new(
                "m",
                None,
                vec![statement(1, "Bob", "hi"), statement(2, "Alice Chen", "yo")],
            )],
        );
        assert_eq!(store.all_contributors(), vec!["Alice Chen", "Bob", "bob"]);
    }

    #[test]
    fn counts() {
        let store = sample();
        assert_eq!(store.commit_count(), 2);
        assert_eq!(store.statement_count(), 2);
        assert_eq!(
            store.all_contributors(),
            vec!["Alice Chen", "Bob", "Carol"]
        );
    }
}
