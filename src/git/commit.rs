//! Normalized commit history model.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::git::SHORT_HASH_LEN;

/// Change status of a single file within a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// File was created by the commit.
    Added,
    /// File contents changed.
    #[default]
    Modified,
    /// File was removed.
    Deleted,
    /// File was moved or renamed.
    Renamed,
}

impl FileStatus {
    /// Parses a status label leniently.
    ///
    /// Accepts long names (`added`) and git status letters (`A`), in any
    /// case. Unknown labels map to [`FileStatus::Modified`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "added" | "a" | "new" => Self::Added,
            "deleted" | "d" | "removed" => Self::Deleted,
            "renamed" | "r" => Self::Renamed,
            _ => Self::Modified,
        }
    }
}

/// Individual file change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// Path to the file relative to repository root.
    pub filename: String,
    /// Lines added.
    pub additions: u64,
    /// Lines removed.
    pub deletions: u64,
    /// Change status.
    pub status: FileStatus,
}

impl FileChange {
    /// Creates a modified-file entry with no line statistics.
    pub fn named(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            additions: 0,
            deletions: 0,
            status: FileStatus::Modified,
        }
    }
}

/// A single commit.
///
/// Fields are private so the short hash can never drift from the full hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    hash: String,
    short_hash: String,
    author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_email: Option<String>,
    timestamp: DateTime<FixedOffset>,
    message: String,
    files: Vec<FileChange>,
}

impl Commit {
    /// Creates a commit, deriving the short hash from `hash`.
    pub fn new(
        hash: impl Into<String>,
        author_name: impl Into<String>,
        author_email: Option<String>,
        timestamp: DateTime<FixedOffset>,
        message: impl Into<String>,
    ) -> Self {
        let hash = hash.into();
        let short_hash = abbreviate(&hash).to_string();
        Self {
            hash,
            short_hash,
            author_name: author_name.into(),
            author_email: author_email.filter(|e| !e.is_empty()),
            timestamp,
            message: message.into(),
            files: Vec::new(),
        }
    }

    /// Returns the commit with the given file changes attached.
    #[must_use]
    pub fn with_files(mut self, files: Vec<FileChange>) -> Self {
        self.files = files;
        self
    }

    /// Full commit hash as it appeared in the input.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// First seven characters of the hash (or the whole hash if shorter).
    pub fn short_hash(&self) -> &str {
        &self.short_hash
    }

    /// Author display name.
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    /// Author email, when the source carried one.
    pub fn author_email(&self) -> Option<&str> {
        self.author_email.as_deref()
    }

    /// Author timestamp.
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Commit message, with body lines joined by single spaces.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Files touched by the commit, in source order.
    pub fn files(&self) -> &[FileChange] {
        &self.files
    }
}

/// Returns the leading [`SHORT_HASH_LEN`] characters of `hash`.
fn abbreviate(hash: &str) -> &str {
    match hash.char_indices().nth(SHORT_HASH_LEN) {
        Some((idx, _)) => &hash[..idx],
        None => hash,
    }
}

/// Ordered commit sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitHistory {
    commits: Vec<Commit>,
}

impl GitHistory {
    /// Wraps commits, preserving their order.
    pub fn new(commits: Vec<Commit>) -> Self {
        Self { commits }
    }

    /// Commits in insertion order.
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    /// Number of commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Whether the history has no commits.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Sorted, de-duplicated author names, recomputed on every call.
    pub fn contributors(&self) -> Vec<String> {
        self.commits
            .iter()
            .map(|c| c.author_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn commit(hash: &str, author: &str) -> Commit {
        Commit::new(hash, author, None, Utc::now().fixed_offset(), "msg")
    }

    #[test]
    fn short_hash_takes_seven_characters() {
        let c = commit("abc1234def5678", "Alice");
        assert_eq!(c.short_hash(), "abc1234");
        assert!(c.hash().starts_with(c.short_hash()));
    }

    #[test]
    fn short_hash_keeps_short_input_whole() {
        let c = commit("abc", "Alice");
        assert_eq!(c.short_hash(), "abc");
    }

    #[test]
    fn short_hash_respects_char_boundaries() {
        let c = commit("ééééééééé", "Alice");
        assert_eq!(c.short_hash().chars().count(), 7);
        assert!(c.hash().starts_with(c.short_hash()));
    }

    #[test]
    fn empty_email_is_dropped() {
        let now = Utc::now().fixed_offset();
        let c = Commit::new("abc1234", "A", Some(String::new()), now, "");
        assert_eq!(c.author_email(), None);
    }

    #[test]
    fn contributors_sorted_unique() {
        let history = GitHistory::new(vec![
            commit("1111111", "Bob"),
            commit("2222222", "Alice"),
            commit("3333333", "Bob"),
        ]);
        assert_eq!(history.contributors(), vec!["Alice", "Bob"]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn contributors_are_case_sensitive() {
        let history = GitHistory::new(vec![commit("1111111", "bob"), commit("2222222", "Bob")]);
        assert_eq!(history.contributors(), vec!["Bob", "bob"]);
    }

    #[test]
    fn file_status_labels() {
        assert_eq!(FileStatus::from_label("A"), FileStatus::Added);
        assert_eq!(FileStatus::from_label("Deleted"), FileStatus::Deleted);
        assert_eq!(FileStatus::from_label("renamed"), FileStatus::Renamed);
        assert_eq!(FileStatus::from_label("M"), FileStatus::Modified);
        assert_eq!(FileStatus::from_label("copied"), FileStatus::Modified);
    }
}
