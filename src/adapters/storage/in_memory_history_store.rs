//! In-Memory History Store Adapter
//!
//! Keeps the ledger in memory. Useful for testing and for runs that
//! should not touch disk.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::memory::SessionHistoryEntry;
use crate::ports::{HistoryRepository, HistoryStorageError};

/// In-memory storage for the history ledger
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    entries: Arc<RwLock<Vec<SessionHistoryEntry>>>,
    saves: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with `entries`
    pub fn with_entries(entries: Vec<SessionHistoryEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
            ..Self::default()
        }
    }

    /// Current ledger contents
    pub async fn entries(&self) -> Vec<SessionHistoryEntry> {
        self.entries.read().await.clone()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make subsequent saves fail with an IO error (useful for tests)
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryStore {
    async fn load_history(&self) -> Result<Vec<SessionHistoryEntry>, HistoryStorageError> {
        Ok(self.entries.read().await.clone())
    }

    async fn save_history(&self, entries: &[SessionHistoryEntry]) -> Result<(), HistoryStorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(HistoryStorageError::Io("simulated write failure".to_string()));
        }
        *self.entries.write().await = entries.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ItemId, SessionId};

    #[tokio::test]
    async fn save_replaces_entries() {
        let store = InMemoryHistoryStore::new();
        let entry = SessionHistoryEntry::new(SessionId::new(), [ItemId::from("x")].into());

        store.save_history(&[entry.clone()]).await.unwrap();

        assert_eq!(store.load_history().await.unwrap(), vec![entry]);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn failing_saves_leave_entries_untouched() {
        let store = InMemoryHistoryStore::new();
        store.set_fail_saves(true);

        let entry = SessionHistoryEntry::new(SessionId::new(), Default::default());
        let result = store.save_history(&[entry]).await;

        assert!(matches!(result, Err(HistoryStorageError::Io(_))));
        assert!(store.entries().await.is_empty());
        assert_eq!(store.save_count(), 0);
    }
}
