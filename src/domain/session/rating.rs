//! Rating entity - one swipe in the session's append-only log.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Direction, ItemId, ParticipantId, RatingId, SessionId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub item_id: ItemId,
    pub direction: Direction,
    pub created_at: Timestamp,
}

impl Rating {
    pub fn new(
        session_id: SessionId,
        participant_id: ParticipantId,
        item_id: ItemId,
        direction: Direction,
    ) -> Self {
        Self {
            id: RatingId::new(),
            session_id,
            participant_id,
            item_id,
            direction,
            created_at: Timestamp::now(),
        }
    }

    /// Returns true if this is an approval of `item_id`.
    pub fn approves(&self, item_id: &ItemId) -> bool {
        self.direction.is_approve() && &self.item_id == item_id
    }
}
