//! Session-scoped handle on the current evidence snapshot.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::data::EvidenceStore;

/// Holds at most one [`EvidenceStore`] for a verification session.
///
/// Replacement swaps the whole snapshot under the write lock, so readers
/// see either the old or the new store and never a mix.
#[derive(Debug, Default)]
pub struct EvidenceSession {
    current: RwLock<Option<Arc<EvidenceStore>>>,
}

impl EvidenceSession {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `store`, returning the snapshot it replaced.
    pub fn replace(&self, store: EvidenceStore) -> Option<Arc<EvidenceStore>> {
        debug!(
            commits = store.commit_count(),
            statements = store.statement_count(),
            "Replacing evidence snapshot"
        );
        let store = Arc::new(store);
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(store)
    }

    /// Current snapshot, if any. The lock is released before returning.
    pub fn snapshot(&self) -> Option<Arc<EvidenceStore>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Discards the snapshot. Returns whether one was present.
    pub fn clear(&self) -> bool {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    /// Whether a snapshot is installed.
    pub fn has_evidence(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
