//! Consensus detection - has every participant approved the same item?
//!
//! Pool order is the tie-break: when several items are unanimously
//! approved, the one earliest in the shared pool wins, regardless of which
//! approval arrived last.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::catalog::{Item, Pool};
use crate::domain::foundation::{ItemId, ParticipantId};

use super::Rating;

/// Full scan over the rating log.
///
/// Returns the first live pool item approved by at least
/// `participant_count` distinct participants.
pub fn check_consensus(
    ratings: &[Rating],
    pool: &Pool,
    participant_count: usize,
) -> Option<Arc<Item>> {
    if participant_count == 0 {
        return None;
    }

    let mut approvals: HashMap<&ItemId, HashSet<ParticipantId>> = HashMap::new();
    for rating in ratings.iter().filter(|r| r.direction.is_approve()) {
        approvals
            .entry(&rating.item_id)
            .or_default()
            .insert(rating.participant_id);
    }

    pool.iter()
        .find(|item| {
            approvals
                .get(&item.id)
                .map_or(false, |approvers| approvers.len() >= participant_count)
        })
        .cloned()
}

/// Incrementally maintained approvers per item.
///
/// Gives the same answer as [`check_consensus`] over the same ratings
/// without rescanning the log on every approval.
#[derive(Debug, Clone, Default)]
pub struct ApprovalTally {
    approvals: HashMap<ItemId, HashSet<ParticipantId>>,
}

impl ApprovalTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the tally from a rating log.
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let mut tally = Self::new();
        for rating in ratings {
            tally.record(rating);
        }
        tally
    }

    /// Counts the rating if it is an approval.
    pub fn record(&mut self, rating: &Rating) {
        if rating.direction.is_approve() {
            self.approvals
                .entry(rating.item_id.clone())
                .or_default()
                .insert(rating.participant_id);
        }
    }

    pub fn clear(&mut self) {
        self.approvals.clear();
    }

    /// Number of distinct participants approving `item_id`.
    pub fn approvers(&self, item_id: &ItemId) -> usize {
        self.approvals.get(item_id).map_or(0, HashSet::len)
    }

    /// First live pool item with at least `participant_count` approvers.
    pub fn first_unanimous(&self, pool: &Pool, participant_count: usize) -> Option<Arc<Item>> {
        if participant_count == 0 {
            return None;
        }

        let unanimous: HashSet<&ItemId> = self
            .approvals
            .iter()
            .filter(|(_, approvers)| approvers.len() >= participant_count)
            .map(|(id, _)| id)
            .collect();
        if unanimous.is_empty() {
            return None;
        }

        pool.iter().find(|item| unanimous.contains(&item.id)).cloned()
    }
}
