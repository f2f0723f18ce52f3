//! Commit history model, parsers and repository ingestion.

pub mod commit;
pub mod date;
pub mod parser;
pub mod repository;

pub use commit::{Commit, FileChange, FileStatus, GitHistory};
pub use parser::{GitHistoryParser, HistoryFormat};
pub use repository::read_repository_history;

/// Number of characters kept in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 7;
