//! Meeting transcript model and parser.

pub mod classify;
pub mod model;
pub mod parser;
pub mod speaker;

pub use model::{SpeakerSummary, Statement, Transcript, DEFAULT_TITLE};
pub use parser::TranscriptParser;
pub use speaker::normalize_speaker;
