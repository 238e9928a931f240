//! Session domain events.
//!
//! Recorded by the aggregate as state changes and drained by the engine
//! for subscribers:
//! - `ParticipantAdded` / `ParticipantRemoved` - Roster edits during setup
//! - `SessionStarted` - Pool built and queues dealt
//! - `ItemRated` - A swipe was appended to the log
//! - `TurnEnded` - The active participant handed the device on
//! - `MatchFound` - Every participant approved the same item
//! - `RoundExhausted` - Everyone finished without a match
//! - `MatchContinued` / `MatchUndone` - Post-match choices
//! - `SessionReplayed` / `SessionReset` - A new session replaced this one

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Direction, ItemId, ParticipantId, SessionId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    ParticipantAdded {
        session_id: SessionId,
        participant_id: ParticipantId,
        name: String,
    },
    ParticipantRemoved {
        session_id: SessionId,
        participant_id: ParticipantId,
    },
    SessionStarted {
        session_id: SessionId,
        participant_count: usize,
        pool_size: usize,
        started_at: Timestamp,
    },
    ItemRated {
        session_id: SessionId,
        participant_id: ParticipantId,
        item_id: ItemId,
        direction: Direction,
    },
    TurnEnded {
        session_id: SessionId,
        participant_id: ParticipantId,
        /// `None` when the round is over.
        next_participant_id: Option<ParticipantId>,
    },
    MatchFound {
        session_id: SessionId,
        item_id: ItemId,
        matched_at: Timestamp,
    },
    RoundExhausted {
        session_id: SessionId,
        shown_count: usize,
    },
    MatchContinued {
        session_id: SessionId,
        item_id: ItemId,
    },
    MatchUndone {
        session_id: SessionId,
        item_id: ItemId,
        retracted_ratings: usize,
    },
    SessionReplayed {
        previous_session_id: SessionId,
        session_id: SessionId,
        kept_roster: bool,
    },
    SessionReset {
        session_id: SessionId,
    },
}

impl SessionEvent {
    /// Dotted event name, e.g. `session.match_found`.
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::ParticipantAdded { .. } => "session.participant_added",
            SessionEvent::ParticipantRemoved { .. } => "session.participant_removed",
            SessionEvent::SessionStarted { .. } => "session.started",
            SessionEvent::ItemRated { .. } => "session.item_rated",
            SessionEvent::TurnEnded { .. } => "session.turn_ended",
            SessionEvent::MatchFound { .. } => "session.match_found",
            SessionEvent::RoundExhausted { .. } => "session.round_exhausted",
            SessionEvent::MatchContinued { .. } => "session.match_continued",
            SessionEvent::MatchUndone { .. } => "session.match_undone",
            SessionEvent::SessionReplayed { .. } => "session.replayed",
            SessionEvent::SessionReset { .. } => "session.reset",
        }
    }

    pub fn session_id(&self) -> SessionId {
        match self {
            SessionEvent::ParticipantAdded { session_id, .. }
            | SessionEvent::ParticipantRemoved { session_id, .. }
            | SessionEvent::SessionStarted { session_id, .. }
            | SessionEvent::ItemRated { session_id, .. }
            | SessionEvent::TurnEnded { session_id, .. }
            | SessionEvent::MatchFound { session_id, .. }
            | SessionEvent::RoundExhausted { session_id, .. }
            | SessionEvent::MatchContinued { session_id, .. }
            | SessionEvent::MatchUndone { session_id, .. }
            | SessionEvent::SessionReplayed { session_id, .. }
            | SessionEvent::SessionReset { session_id } => *session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = SessionEvent::MatchFound {
            session_id: SessionId::new(),
            item_id: ItemId::from("x"),
            matched_at: Timestamp::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "match_found");
        assert_eq!(json["item_id"], "x");
    }

    #[test]
    fn event_type_is_dotted() {
        let event = SessionEvent::RoundExhausted {
            session_id: SessionId::new(),
            shown_count: 3,
        };
        assert_eq!(event.event_type(), "session.round_exhausted");
    }
}
