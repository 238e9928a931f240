//! History storage configuration

use serde::Deserialize;
use std::path::PathBuf;

/// History storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// YAML file holding the session history ledger
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
        }
    }
}

fn default_history_path() -> PathBuf {
    PathBuf::from("./data/session_history.yaml")
}
