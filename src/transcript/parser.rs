//! Meeting transcript parser.
//!
//! Lines are classified independently by [`classify_line`] and fed to a
//! two-state accumulator:
//!
//! | state | line class      | action                              | next  |
//! |-------|-----------------|-------------------------------------|-------|
//! | Idle  | Timestamped     | emit statement                      | Idle  |
//! | Idle  | OpenStatement   | start statement                     | Open  |
//! | Idle  | Unmatched       | drop line                           | Idle  |
//! | Open  | Timestamped     | flush open statement, emit new one  | Idle  |
//! | Open  | OpenStatement   | flush open statement, start new one | Open  |
//! | Open  | Unmatched       | append line to open statement       | Open  |
//! | any   | Blank / Header  | nothing                             | same  |

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::transcript::classify::{classify_line, LineClass};
use crate::transcript::model::{Statement, Transcript};
use crate::transcript::speaker::normalize_speaker;

/// Number of leading lines searched for a meeting date.
const DATE_SCAN_LINES: usize = 5;

/// Date shapes searched for, paired with their chrono format.
static DATE_PATTERNS: LazyLock<[(Regex, &'static str); 3]> = LazyLock::new(|| {
    [
        (
            Regex::new(r"\d{4}-\d{2}-\d{2}").expect("ISO date regex is valid"),
            "%Y-%m-%d",
        ),
        (
            Regex::new(r"\d{2}/\d{2}/\d{4}").expect("US slash date regex is valid"),
            "%m/%d/%Y",
        ),
        (
            Regex::new(r"\d{2}-\d{2}-\d{4}").expect("US dash date regex is valid"),
            "%m-%d-%Y",
        ),
    ]
});

/// Parser for speaker-attributed meeting text.
pub struct TranscriptParser;

impl TranscriptParser {
    /// Parses `content` into a transcript titled `title`. Never fails.
    pub fn parse(content: &str, title: &str) -> Transcript {
        let date = extract_meeting_date(content);

        let mut accumulator = StatementAccumulator::default();
        for (idx, line) in content.lines().enumerate() {
            accumulator.accept(idx + 1, line);
        }
        let statements = accumulator.finish();

        debug!(
            title,
            statements = statements.len(),
            date = ?date,
            "Parsed transcript"
        );
        Transcript::new(title, date, statements)
    }
}

/// Finds the first calendar-valid date in the first few lines.
///
/// Leading and trailing blank space is trimmed from `content` first; blank
/// lines after that still count toward the limit.
pub fn extract_meeting_date(content: &str) -> Option<NaiveDate> {
    content
        .trim()
        .lines()
        .take(DATE_SCAN_LINES)
        .find_map(date_in_line)
}

fn date_in_line(line: &str) -> Option<NaiveDate> {
    DATE_PATTERNS.iter().find_map(|(pattern, format)| {
        pattern
            .find_iter(line)
            .find_map(|m| NaiveDate::parse_from_str(m.as_str(), format).ok())
    })
}

/// A statement still collecting continuation lines.
#[derive(Debug)]
struct OpenStatement {
    speaker: String,
    content: String,
    line_number: usize,
}

impl OpenStatement {
    fn into_statement(self) -> Statement {
        Statement {
            speaker: self.speaker,
            content: self.content,
            timestamp: None,
            line_number: self.line_number,
        }
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Open(OpenStatement),
}

/// Accumulator state machine; see the module docs for its transitions.
#[derive(Debug, Default)]
struct StatementAccumulator {
    state: State,
    statements: Vec<Statement>,
}

impl StatementAccumulator {
    fn accept(&mut self, line_number: usize, line: &str) {
        match classify_line(line) {
            LineClass::Blank | LineClass::Header => {}
            LineClass::Timestamped {
                timestamp,
                speaker,
                content,
            } => {
                let speaker = normalize_speaker(speaker);
                if speaker.is_empty() {
                    self.continue_with(line.trim());
                    return;
                }
                self.flush();
                self.statements.push(Statement {
                    speaker,
                    content: content.to_string(),
                    timestamp: Some(timestamp.to_string()),
                    line_number,
                });
            }
            LineClass::OpenStatement {
                speaker, content, ..
            } => {
                let speaker = normalize_speaker(speaker);
                if speaker.is_empty() {
                    self.continue_with(line.trim());
                    return;
                }
                self.flush();
                self.state = State::Open(OpenStatement {
                    speaker,
                    content: content.to_string(),
                    line_number,
                });
            }
            LineClass::Unmatched(text) => self.continue_with(text),
        }
    }

    /// Appends continuation text to the open statement, or drops it.
    fn continue_with(&mut self, text: &str) {
        match &mut self.state {
            State::Open(open) => {
                if !open.content.is_empty() {
                    open.content.push(' ');
                }
                open.content.push_str(text);
            }
            State::Idle => debug!(text, "Dropping unattributed line"),
        }
    }

    fn flush(&mut self) {
        if let State::Open(open) = std::mem::take(&mut self.state) {
            self.statements.push(open.into_statement());
        }
    }

    fn finish(mut self) -> Vec<Statement> {
        self.flush();
        self.statements
    }
}
