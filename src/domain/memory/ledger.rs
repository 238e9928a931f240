//! Session memory - which items recent sessions already showed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::domain::foundation::{ItemId, SessionId, Timestamp};

/// Number of recent sessions whose items are kept out of new pools.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Items shown during one concluded session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHistoryEntry {
    pub session_id: SessionId,
    pub shown_item_ids: BTreeSet<ItemId>,
    pub created_at: Timestamp,
}

impl SessionHistoryEntry {
    pub fn new(session_id: SessionId, shown_item_ids: BTreeSet<ItemId>) -> Self {
        Self {
            session_id,
            shown_item_ids,
            created_at: Timestamp::now(),
        }
    }

    /// Overrides the creation time (used when replaying stored ledgers).
    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Bounded ledger logic over a history list.
///
/// Pure: callers load the history, pass it in, and persist what comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionMemory {
    window: usize,
}

impl SessionMemory {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Union of items shown in the `window` most recent sessions.
    pub fn exclusion_set(&self, history: &[SessionHistoryEntry]) -> HashSet<ItemId> {
        let mut recent: Vec<&SessionHistoryEntry> = history.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        recent
            .into_iter()
            .take(self.window)
            .flat_map(|entry| entry.shown_item_ids.iter().cloned())
            .collect()
    }

    /// Prepends `entry` and truncates to the window.
    ///
    /// A session holds at most one slot: an older entry with the same
    /// session id is replaced by `entry`. Stored order is insertion order;
    /// recency for exclusion is read from `created_at`.
    pub fn record(
        &self,
        entry: SessionHistoryEntry,
        history: Vec<SessionHistoryEntry>,
    ) -> Vec<SessionHistoryEntry> {
        let session_id = entry.session_id;
        let mut updated = Vec::with_capacity(history.len() + 1);
        updated.push(entry);
        updated.extend(history.into_iter().filter(|e| e.session_id != session_id));
        updated.truncate(self.window);
        updated
    }
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}
