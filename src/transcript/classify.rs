//! Stateless per-line classification for transcript text.
//!
//! Each line is mapped to exactly one [`LineClass`]; the accumulator in
//! [`super::parser`] decides what the class means given its current state.

use std::sync::LazyLock;

use regex::Regex;

/// `[HH:MM[:SS]] Speaker: message` (brackets optional).
static TIMESTAMPED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[?(\d{1,2}:\d{2}(?::\d{2})?)\]?\s*([^:\[\]]+?):\s*(.+)$")
        .expect("timestamped regex is valid")
});

/// `Speaker: message`
static COLON_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:\[\]]{2,30}):\s*(.+)$").expect("colon regex is valid"));

/// `[Speaker] message`
static BRACKETED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]+)\]\s*(.+)$").expect("bracketed regex is valid"));

/// `Speaker - message`
static DASHED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^-]{2,30})\s*-\s*(.+)$").expect("dashed regex is valid"));

/// Lower-case substrings marking a header or metadata line.
const HEADER_MARKERS: &[&str] = &[
    "meeting transcript",
    "meeting notes",
    "attendees:",
    "participants:",
    "date:",
    "time:",
    "location:",
];

/// Characters whose bare repetition forms a separator line.
const SEPARATOR_CHARS: &[char] = &['-', '=', '*'];

/// Which speaker-attribution dialect opened a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `Speaker: message`
    Colon,
    /// `[Speaker] message`
    Bracketed,
    /// `Speaker - message`
    Dashed,
}

/// Classification of one trimmed transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Empty after trimming.
    Blank,
    /// Header, metadata or separator line.
    Header,
    /// Self-contained timestamped statement.
    Timestamped {
        /// Raw time token.
        timestamp: &'a str,
        /// Raw speaker label.
        speaker: &'a str,
        /// Message text.
        content: &'a str,
    },
    /// Start of a statement that may continue on following lines.
    OpenStatement {
        /// Dialect that matched.
        dialect: Dialect,
        /// Raw speaker label.
        speaker: &'a str,
        /// First line of message text.
        content: &'a str,
    },
    /// No speaker attribution; continuation text if a statement is open.
    Unmatched(&'a str),
}

/// Whether a line is header or separator noise.
pub fn is_header_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    HEADER_MARKERS.iter().any(|m| lower.contains(m)) || is_separator_line(line)
}

fn is_separator_line(line: &str) -> bool {
    let mut chars = line.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    SEPARATOR_CHARS.contains(&first) && line.chars().count() >= 3 && chars.all(|c| c == first)
}

/// Classifies one line. Priority: timestamped, colon, bracketed, dashed.
pub fn classify_line(line: &str) -> LineClass<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineClass::Blank;
    }
    if is_header_line(line) {
        return LineClass::Header;
    }

    if let Some(caps) = TIMESTAMPED_PATTERN.captures(line) {
        if let (Some(ts), Some(sp), Some(msg)) = (caps.get(1), caps.get(2), caps.get(3)) {
            return LineClass::Timestamped {
                timestamp: ts.as_str(),
                speaker: sp.as_str(),
                content: msg.as_str().trim(),
            };
        }
    }

    let openers: [(&Regex, Dialect); 3] = [
        (&COLON_PATTERN, Dialect::Colon),
        (&BRACKETED_PATTERN, Dialect::Bracketed),
        (&DASHED_PATTERN, Dialect::Dashed),
    ];
    for (pattern, dialect) in openers {
        if let Some(caps) = pattern.captures(line) {
            if let (Some(sp), Some(msg)) = (caps.get(1), caps.get(2)) {
                return LineClass::OpenStatement {
                    dialect,
                    speaker: sp.as_str(),
                    content: msg.as_str().trim(),
                };
            }
        }
    }

    LineClass::Unmatched(line)
}
