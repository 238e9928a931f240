//! End-of-session statistics computed from the rating log.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::catalog::Item;
use crate::domain::foundation::{ItemId, ParticipantId, SessionId, SessionStatus};

use super::MatchSession;

/// How many runner-up items the summary lists.
pub const TOP_ITEMS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantSummary {
    pub participant_id: ParticipantId,
    pub name: String,
    pub total: usize,
    pub approvals: usize,
    pub rejections: usize,
    /// Share of this participant's ratings that were approvals, 0-100.
    pub approval_percentage: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemApprovals {
    pub item: Arc<Item>,
    pub approvals: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub matched_item: Option<Arc<Item>>,
    pub total_ratings: usize,
    pub approvals: usize,
    pub rejections: usize,
    pub participants: Vec<ParticipantSummary>,
    /// Most-approved items other than the match, ties in pool order.
    pub top_items: Vec<ItemApprovals>,
}

impl SessionSummary {
    pub fn from_session(session: &MatchSession) -> Self {
        let ratings = session.ratings();
        let approvals = ratings.iter().filter(|r| r.direction.is_approve()).count();

        let participants = session
            .participants()
            .iter()
            .map(|p| {
                let (total, approved) = ratings
                    .iter()
                    .filter(|r| r.participant_id == p.id)
                    .fold((0, 0), |(total, approved), r| {
                        (total + 1, approved + usize::from(r.direction.is_approve()))
                    });
                ParticipantSummary {
                    participant_id: p.id,
                    name: p.name.clone(),
                    total,
                    approvals: approved,
                    rejections: total - approved,
                    approval_percentage: percentage(approved, total),
                }
            })
            .collect();

        let matched_item = session.matched_item().cloned();
        let mut counts: HashMap<&ItemId, usize> = HashMap::new();
        for rating in ratings.iter().filter(|r| r.direction.is_approve()) {
            if matched_item.as_ref().map_or(false, |m| m.id == rating.item_id) {
                continue;
            }
            *counts.entry(&rating.item_id).or_default() += 1;
        }

        let mut top: Vec<(usize, usize, Arc<Item>)> = counts
            .into_iter()
            .filter_map(|(id, count)| {
                let position = session.pool().position(id)?;
                let item = session.item_by_id(id)?;
                Some((count, position, Arc::clone(item)))
            })
            .collect();
        top.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let top_items = top
            .into_iter()
            .take(TOP_ITEMS)
            .map(|(approvals, _, item)| ItemApprovals { item, approvals })
            .collect();

        Self {
            session_id: session.id(),
            status: session.status(),
            matched_item,
            total_ratings: ratings.len(),
            approvals,
            rejections: ratings.len() - approvals,
            participants,
            top_items,
        }
    }
}

fn percentage(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        0.0
    } else {
        part as f32 / whole as f32 * 100.0
    }
}
