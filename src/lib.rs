//! # contrib-truth
//!
//! Evidence-backed verification of contribution claims.
//!
//! Commit history and meeting transcripts in whatever shape they arrive are
//! normalized into one evidence snapshot. A claim such as "Alice built the
//! login system" is then judged against it, by an AI disproval loop when a
//! provider is configured and by a local heuristic otherwise.
//!
//! ## Quick Start
//!
//! ```rust
//! use contrib_truth::data::{EvidenceStore, VerdictKind};
//! use contrib_truth::git::GitHistoryParser;
//! use contrib_truth::verify::HeuristicVerdictEngine;
//!
//! let history = GitHistoryParser::parse("abc1234 Alice - Add login form");
//! let store = EvidenceStore::new(Some(history), Vec::new());
//! let verdict = HeuristicVerdictEngine::evaluate("Bob", "built login", &store.render_context());
//! assert_eq!(verdict.kind(), VerdictKind::Disputed);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod data;
pub mod git;
pub mod reasoning;
pub mod service;
pub mod transcript;
pub mod utils;
pub mod verify;

pub use crate::cli::Cli;

/// The current version of contrib-truth.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
