//! Celebration window - the pause between a match and the next step.
//!
//! A timer and the user race to resolve the same window. The first
//! resolution wins; anything arriving later is ignored.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ItemId, Timestamp};

/// How a celebration window was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResolution {
    /// Accept the match and show the summary. Also the timer's choice.
    Finish,
    /// Skip this match and keep rating.
    KeepLooking,
    /// Undo the match and resume where it happened.
    GoBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelebrationWindow {
    id: u64,
    item_id: ItemId,
    opened_at: Timestamp,
    resolution: Option<MatchResolution>,
}

impl CelebrationWindow {
    pub fn open(id: u64, item_id: ItemId) -> Self {
        Self {
            id,
            item_id,
            opened_at: Timestamp::now(),
            resolution: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn opened_at(&self) -> Timestamp {
        self.opened_at
    }

    pub fn resolution(&self) -> Option<MatchResolution> {
        self.resolution
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// Settles the window. Returns false if it was already settled.
    pub fn resolve(&mut self, resolution: MatchResolution) -> bool {
        if self.resolution.is_some() {
            return false;
        }
        self.resolution = Some(resolution);
        true
    }
}
