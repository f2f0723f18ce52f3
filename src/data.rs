//! Evidence snapshot, verdict model and session state.

pub mod session;
pub mod store;
pub mod verdict;

pub use session::EvidenceSession;
pub use store::EvidenceStore;
pub use verdict::{Evidence, EvidenceKind, EvidenceStrength, Verdict, VerdictKind};
