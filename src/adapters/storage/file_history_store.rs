//! File-based History Store Adapter
//!
//! Stores the session-memory ledger as a single YAML file on disk.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::memory::SessionHistoryEntry;
use crate::ports::{HistoryRepository, HistoryStorageError};

/// YAML-file storage for the history ledger
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    /// Create a store backed by the file at `path`
    ///
    /// The file and its parent directory are created on first save.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileHistoryStore::new("./data/session_history.yaml");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryRepository for FileHistoryStore {
    async fn load_history(&self) -> Result<Vec<SessionHistoryEntry>, HistoryStorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let yaml = fs::read_to_string(&self.path)
            .await
            .map_err(|e| HistoryStorageError::Io(e.to_string()))?;
        if yaml.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_yaml::from_str(&yaml).map_err(|e| HistoryStorageError::Deserialization(e.to_string()))
    }

    async fn save_history(&self, entries: &[SessionHistoryEntry]) -> Result<(), HistoryStorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| HistoryStorageError::Io(e.to_string()))?;
        }

        let yaml = serde_yaml::to_string(entries)
            .map_err(|e| HistoryStorageError::Serialization(e.to_string()))?;

        fs::write(&self.path, yaml)
            .await
            .map_err(|e| HistoryStorageError::Io(e.to_string()))
    }
}
