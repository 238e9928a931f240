//! History Repository Port - Interface for the session-memory ledger.
//!
//! The ledger is the only state that survives a restart.

use async_trait::async_trait;

use crate::domain::memory::SessionHistoryEntry;

/// Errors that can occur while loading or saving history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryStorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to serialize history: {0}")]
    Serialization(String),

    #[error("Failed to deserialize history: {0}")]
    Deserialization(String),
}

/// Port for persisting the session history ledger.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Load every stored entry. An absent ledger is an empty one.
    async fn load_history(&self) -> Result<Vec<SessionHistoryEntry>, HistoryStorageError>;

    /// Replace the stored ledger with `entries`.
    async fn save_history(&self, entries: &[SessionHistoryEntry]) -> Result<(), HistoryStorageError>;
}
