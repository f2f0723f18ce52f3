//! Auto-detecting `git log` parser.
//!
//! Accepts a JSON array of commit objects, newline-delimited JSON objects,
//! `git log --oneline`-style text and full `git log` output. Parsing never
//! fails: malformed records are skipped and the rest of the batch survives.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::git::commit::{Commit, FileChange, FileStatus, GitHistory};
use crate::git::date::{from_epoch_seconds, now, parse_date_or_now};

/// `<hex 7-40> <author> - <message>`
static ONELINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-f0-9]{7,40})\s+(.+?)\s*-\s*(.+)$").expect("oneline regex is valid")
});

/// `Author: Name <email>`
static AUTHOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Author:\s*(.+?)\s*<(.+?)>").expect("author regex is valid")
});

/// Alias keys per commit field, highest priority first.
const HASH_KEYS: &[&str] = &["hash", "commit", "sha"];
const AUTHOR_KEYS: &[&str] = &["author", "author_name"];
const EMAIL_KEYS: &[&str] = &["email", "author_email"];
const MESSAGE_KEYS: &[&str] = &["message", "subject", "title"];
const DATE_KEYS: &[&str] = &["date", "timestamp", "authored_date"];
const FILENAME_KEYS: &[&str] = &["filename", "name", "path"];

/// Author recorded when the source names none.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Input dialect family, chosen from the leading character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFormat {
    /// JSON array or newline-delimited JSON objects.
    Json,
    /// `git log` text, oneline or standard.
    Text,
}

impl HistoryFormat {
    /// Detects the format of a raw payload.
    pub fn detect(content: &str) -> Self {
        let trimmed = content.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Why a single JSON record was skipped.
#[derive(Debug, Error, PartialEq, Eq)]
enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no commit hash")]
    MissingHash,
    #[error("field `{field}` should be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Parser for commit history payloads.
pub struct GitHistoryParser;

impl GitHistoryParser {
    /// Parses a payload, auto-detecting JSON versus text.
    pub fn parse(content: &str) -> GitHistory {
        let history = match HistoryFormat::detect(content) {
            HistoryFormat::Json => Self::parse_json(content),
            HistoryFormat::Text => Self::parse_text(content),
        };
        debug!(commits = history.len(), "Parsed commit history");
        history
    }

    /// Parses a JSON array or newline-delimited JSON objects.
    ///
    /// A trailing comma on the whole blob or on individual lines is
    /// tolerated.
    pub fn parse_json(content: &str) -> GitHistory {
        let blob = content.trim();
        let blob = blob.strip_suffix(',').unwrap_or(blob).trim_end();

        let wrapped;
        let array_text = if blob.starts_with('[') {
            blob
        } else {
            wrapped = format!("[{blob}]");
            wrapped.as_str()
        };

        let records: Vec<Value> = match serde_json::from_str(array_text) {
            Ok(records) => records,
            Err(e) => {
                debug!(error = %e, "Payload is not a JSON array, trying one object per line");
                blob.lines()
                    .filter_map(|line| {
                        let line = line.trim();
                        let line = line.strip_suffix(',').unwrap_or(line).trim_end();
                        if line.is_empty() {
                            return None;
                        }
                        match serde_json::from_str::<Value>(line) {
                            Ok(value) => Some(value),
                            Err(e) => {
                                debug!(error = %e, "Skipping undecodable JSON line");
                                None
                            }
                        }
                    })
                    .collect()
            }
        };

        let commits = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| match commit_from_json(record) {
                Ok(commit) => Some(commit),
                Err(e) => {
                    warn!(index, reason = %e, "Skipping malformed commit record");
                    None
                }
            })
            .collect();

        GitHistory::new(commits)
    }

    /// Parses `git log` text in the oneline and standard dialects.
    ///
    /// Each line is first matched against the oneline shape; a match emits a
    /// complete commit on its own. Other lines drive the standard
    /// header/body state machine, so the two dialects may interleave.
    pub fn parse_text(content: &str) -> GitHistory {
        let mut commits = Vec::new();
        let mut pending: Option<PendingCommit> = None;

        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(caps) = ONELINE_PATTERN.captures(line) {
                commits.push(Commit::new(
                    &caps[1],
                    caps[2].trim(),
                    None,
                    now(),
                    caps[3].trim(),
                ));
                continue;
            }

            if let Some(rest) = line.strip_prefix("commit ") {
                if let Some(done) = pending.take() {
                    commits.push(done.finish());
                }
                pending = rest
                    .split_whitespace()
                    .next()
                    .map(|hash| PendingCommit::new(hash.to_string()));
                continue;
            }

            let Some(current) = pending.as_mut() else {
                debug!(line, "Ignoring line outside of any commit");
                continue;
            };

            if line.starts_with("Author:") {
                if let Some(caps) = AUTHOR_PATTERN.captures(line) {
                    current.author = Some(caps[1].trim().to_string());
                    current.email = Some(caps[2].trim().to_string());
                } else {
                    current.author = Some(line["Author:".len()..].trim().to_string());
                }
            } else if let Some(date) = line.strip_prefix("Date:") {
                current.date = Some(date.trim().to_string());
            } else if !line.starts_with("Merge:") {
                current.push_message_line(line);
            }
        }

        if let Some(done) = pending {
            commits.push(done.finish());
        }

        GitHistory::new(commits)
    }
}

/// A standard-dialect commit whose header and body are still being read.
#[derive(Debug)]
struct PendingCommit {
    hash: String,
    author: Option<String>,
    email: Option<String>,
    date: Option<String>,
    message: String,
}

impl PendingCommit {
    fn new(hash: String) -> Self {
        Self {
            hash,
            author: None,
            email: None,
            date: None,
            message: String::new(),
        }
    }

    fn push_message_line(&mut self, line: &str) {
        if !self.message.is_empty() {
            self.message.push(' ');
        }
        self.message.push_str(line);
    }

    fn finish(self) -> Commit {
        let timestamp = self.date.as_deref().map_or_else(now, parse_date_or_now);
        let author = self
            .author
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        Commit::new(
            self.hash,
            author,
            self.email,
            timestamp,
            self.message.trim(),
        )
    }
}

/// Whether a JSON value counts as "present" for alias resolution.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Returns the first present value among `keys`.
fn resolve<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| is_present(value))
}

fn string_field(
    record: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
) -> Result<Option<String>, RecordError> {
    match resolve(record, keys) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RecordError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

fn commit_from_json(record: &Value) -> Result<Commit, RecordError> {
    let record = record.as_object().ok_or(RecordError::NotAnObject)?;

    let hash = string_field(record, HASH_KEYS, "hash")?.ok_or(RecordError::MissingHash)?;
    let author = string_field(record, AUTHOR_KEYS, "author")?
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let email = string_field(record, EMAIL_KEYS, "email")?;
    let message = string_field(record, MESSAGE_KEYS, "message")?.unwrap_or_default();

    let timestamp = match resolve(record, DATE_KEYS) {
        Some(Value::String(raw)) => parse_date_or_now(raw),
        Some(Value::Number(n)) => n.as_f64().and_then(from_epoch_seconds).unwrap_or_else(now),
        _ => now(),
    };

    let files = match record.get("files") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries.iter().filter_map(file_from_json).collect(),
        Some(_) => {
            return Err(RecordError::WrongType {
                field: "files",
                expected: "an array",
            })
        }
    };

    Ok(Commit::new(hash, author, email, timestamp, message).with_files(files))
}

fn file_from_json(entry: &Value) -> Option<FileChange> {
    match entry {
        Value::String(name) if !name.is_empty() => Some(FileChange::named(name.as_str())),
        Value::Object(fields) => {
            let filename = resolve(fields, FILENAME_KEYS)?.as_str()?.to_string();
            let count = |key: &str| fields.get(key).and_then(Value::as_u64).unwrap_or(0);
            let status = fields
                .get("status")
                .and_then(Value::as_str)
                .map(FileStatus::from_label)
                .unwrap_or_default();
            Some(FileChange {
                filename,
                additions: count("additions"),
                deletions: count("deletions"),
                status,
            })
        }
        _ => {
            debug!(entry = %entry, "Skipping unrecognised file entry");
            None
        }
    }
}
