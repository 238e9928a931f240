//! Session engine configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Session engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Number of recent sessions whose items are kept out of new pools
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Seconds a match is celebrated before the summary shows on its own
    #[serde(default = "default_celebration_secs")]
    pub celebration_secs: u64,

    /// Participants needed before swiping can start
    #[serde(default = "default_min_participants")]
    pub min_participants: usize,
}

impl SessionConfig {
    /// Get the celebration delay as Duration
    pub fn celebration_delay(&self) -> Duration {
        Duration::from_secs(self.celebration_secs)
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_window == 0 {
            return Err(ValidationError::InvalidHistoryWindow);
        }
        if self.min_participants < 2 {
            return Err(ValidationError::InvalidMinParticipants(self.min_participants));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            celebration_secs: default_celebration_secs(),
            min_participants: default_min_participants(),
        }
    }
}

fn default_history_window() -> usize {
    10
}

fn default_celebration_secs() -> u64 {
    5
}

fn default_min_participants() -> usize {
    2
}
