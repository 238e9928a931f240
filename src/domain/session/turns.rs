//! Turn handling - rating items and passing the device on.

use std::sync::Arc;

use tracing::debug;

use crate::domain::catalog::Item;
use crate::domain::foundation::{Direction, ItemId, ParticipantId, SessionStatus, Timestamp};

use super::{MatchSession, Rating, SessionError, SessionEvent};

/// Result of a single rating.
#[derive(Debug, Clone, PartialEq)]
pub enum RateOutcome {
    Recorded,
    /// The rating completed a consensus; the session is now `Completed`.
    Matched(Arc<Item>),
}

/// Result of ending a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The device passes to this participant.
    NextParticipant(ParticipantId),
    /// The final check of the round found a consensus.
    Matched(Arc<Item>),
    /// Everyone finished and nothing was unanimous.
    RoundExhausted,
}

impl MatchSession {
    /// Records the active participant's rating of `item_id`.
    ///
    /// Approvals are checked for consensus immediately. The cursor advances
    /// one step either way and stops at the end of the queue, where
    /// [`MatchSession::is_queue_exhausted`] starts returning true.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless swiping
    /// - `UnknownItem` if the item is not a live candidate of this session
    pub fn rate(
        &mut self,
        item_id: &ItemId,
        direction: Direction,
    ) -> Result<RateOutcome, SessionError> {
        self.require_swiping("rate an item")?;
        let index = self.active_index()?;
        if !self.pool.is_live(item_id) {
            return Err(SessionError::UnknownItem(item_id.clone()));
        }

        let participant_id = self.participants[index].id;
        let rating = Rating::new(self.id, participant_id, item_id.clone(), direction);
        self.tally.record(&rating);
        self.ratings.push(rating);
        self.shown.insert(item_id.clone());
        self.record_event(SessionEvent::ItemRated {
            session_id: self.id,
            participant_id,
            item_id: item_id.clone(),
            direction,
        });

        let mut outcome = RateOutcome::Recorded;
        if direction.is_approve() {
            if let Some(item) = self.tally.first_unanimous(&self.pool, self.participants.len()) {
                self.complete_with_match(Arc::clone(&item))?;
                outcome = RateOutcome::Matched(item);
            }
        }

        self.advance_cursor();
        Ok(outcome)
    }

    /// Marks the active participant done and hands the device on.
    ///
    /// When the last participant finishes, consensus is checked once more
    /// before the round is declared exhausted.
    pub fn end_turn(&mut self) -> Result<TurnOutcome, SessionError> {
        self.require_swiping("end a turn")?;
        let index = self.active_index()?;
        let participant_id = self.participants[index].id;
        self.participants[index].has_completed = true;

        if self.participants.iter().all(|p| p.has_completed) {
            self.record_event(SessionEvent::TurnEnded {
                session_id: self.id,
                participant_id,
                next_participant_id: None,
            });

            if let Some(item) = self.tally.first_unanimous(&self.pool, self.participants.len()) {
                self.complete_with_match(Arc::clone(&item))?;
                return Ok(TurnOutcome::Matched(item));
            }

            self.transition(SessionStatus::Completed)?;
            self.record_event(SessionEvent::RoundExhausted {
                session_id: self.id,
                shown_count: self.shown.len(),
            });
            debug!(session_id = %self.id, "Round exhausted without a match");
            return Ok(TurnOutcome::RoundExhausted);
        }

        let next = self.next_pending_after(index).ok_or_else(|| {
            SessionError::invariant("no pending participant left in an unfinished round")
        })?;
        let next_id = self.participants[next].id;

        self.current_participant_index = next;
        self.cursor = 0;
        self.mark_current_shown();
        self.record_event(SessionEvent::TurnEnded {
            session_id: self.id,
            participant_id,
            next_participant_id: Some(next_id),
        });
        Ok(TurnOutcome::NextParticipant(next_id))
    }

    /// Next participant in roster order, wrapping, who has not finished.
    fn next_pending_after(&self, index: usize) -> Option<usize> {
        let count = self.participants.len();
        (1..=count)
            .map(|step| (index + step) % count)
            .find(|&i| !self.participants[i].has_completed)
    }

    fn advance_cursor(&mut self) {
        let len = self.active_queue().len();
        self.cursor = (self.cursor + 1).min(len);
        if self.status.accepts_ratings() {
            self.mark_current_shown();
        }
    }

    fn complete_with_match(&mut self, item: Arc<Item>) -> Result<(), SessionError> {
        self.transition(SessionStatus::Completed)?;
        self.record_event(SessionEvent::MatchFound {
            session_id: self.id,
            item_id: item.id.clone(),
            matched_at: Timestamp::now(),
        });
        debug!(session_id = %self.id, item_id = %item.id, "Consensus reached");
        self.matched_item = Some(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;

    fn items(ids: &[&str]) -> Vec<Item> {
        ids.iter()
            .map(|id| Item::new(*id, id.to_uppercase(), "Comedy", 30, 8.0).unwrap())
            .collect()
    }

    fn started(names: &[&str], ids: &[&str]) -> MatchSession {
        let mut session = MatchSession::new();
        for name in names {
            session.add_participant(name).unwrap();
        }
        session.begin_swiping(SessionId::new(), items(ids), 2).unwrap();
        session.take_events();
        session
    }

    fn id(s: &str) -> ItemId {
        ItemId::from(s)
    }

    /// Rates the whole active queue with `direction`, then ends the turn.
    fn rate_all(session: &mut MatchSession, direction: Direction) -> TurnOutcome {
        while let Some(item) = session.current_item().cloned() {
            session.rate(&item.id, direction).unwrap();
        }
        session.end_turn().unwrap()
    }

    #[test]
    fn two_participants_match_on_shared_approval() {
        let mut session = started(&["A", "B"], &["x", "y", "z"]);

        session.rate(&id("x"), Direction::Approve).unwrap();
        session.rate(&id("y"), Direction::Reject).unwrap();
        session.rate(&id("z"), Direction::Approve).unwrap();
        assert!(matches!(session.end_turn().unwrap(), TurnOutcome::NextParticipant(_)));

        let outcome = session.rate(&id("x"), Direction::Approve).unwrap();
        match outcome {
            RateOutcome::Matched(item) => assert_eq!(item.id, id("x")),
            other => panic!("expected match, got {:?}", other),
        }
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.matched_item().unwrap().id, id("x"));
    }

    #[test]
    fn rating_while_completed_is_refused() {
        let mut session = started(&["A", "B"], &["x"]);
        session.rate(&id("x"), Direction::Approve).unwrap();
        session.end_turn().unwrap();
        session.rate(&id("x"), Direction::Approve).unwrap();

        let before = session.ratings().len();
        let result = session.rate(&id("x"), Direction::Reject);
        assert!(matches!(result, Err(SessionError::InvalidState { .. })));
        assert_eq!(session.ratings().len(), before);
    }

    #[test]
    fn rating_unknown_item_is_refused() {
        let mut session = started(&["A", "B"], &["x"]);
        let result = session.rate(&id("nope"), Direction::Approve);
        assert_eq!(result, Err(SessionError::UnknownItem(id("nope"))));
        assert!(session.ratings().is_empty());
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn cursor_stops_at_queue_end() {
        let mut session = started(&["A", "B"], &["x", "y"]);
        assert_eq!(session.remaining_in_queue(), 2);

        session.rate(&id("x"), Direction::Reject).unwrap();
        session.rate(&id("y"), Direction::Reject).unwrap();
        assert!(session.is_queue_exhausted());
        assert!(session.current_item().is_none());

        session.rate(&id("x"), Direction::Reject).unwrap();
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.remaining_in_queue(), 0);
    }

    #[test]
    fn end_turn_rotates_in_roster_order_and_resets_cursor() {
        let mut session = started(&["A", "B", "C"], &["x", "y"]);
        let roster: Vec<ParticipantId> = session.participants().iter().map(|p| p.id).collect();

        session.rate(&id("x"), Direction::Reject).unwrap();
        assert_eq!(session.end_turn().unwrap(), TurnOutcome::NextParticipant(roster[1]));
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.active_participant().unwrap().id, roster[1]);
        assert!(session.participants()[0].has_completed);

        assert_eq!(session.end_turn().unwrap(), TurnOutcome::NextParticipant(roster[2]));
    }

    #[test]
    fn round_exhaustion_completes_without_match() {
        let mut session = started(&["A", "B"], &["x", "y", "z"]);

        assert!(matches!(rate_all(&mut session, Direction::Reject), TurnOutcome::NextParticipant(_)));
        assert_eq!(rate_all(&mut session, Direction::Reject), TurnOutcome::RoundExhausted);

        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session.matched_item().is_none());
        assert_eq!(session.shown_item_ids().len(), 3);
        assert!(session
            .take_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::RoundExhausted { shown_count: 3, .. })));
    }

    #[test]
    fn shown_items_are_those_the_cursor_reached() {
        let mut session = started(&["A", "B"], &["a", "b", "c", "d", "e"]);
        let first = session.current_item().unwrap().id.clone();
        session.rate(&first, Direction::Reject).unwrap();
        let second = session.current_item().unwrap().id.clone();
        session.end_turn().unwrap();
        let third = session.current_item().unwrap().id.clone();
        session.end_turn().unwrap();

        let mut expected: Vec<ItemId> = vec![first, second, third];
        expected.sort();
        expected.dedup();
        let shown: Vec<ItemId> = session.shown_item_ids().iter().cloned().collect();
        assert_eq!(shown, expected);
    }

    #[test]
    fn end_turn_outside_swiping_is_refused() {
        let mut session = MatchSession::new();
        session.add_participant("A").unwrap();
        let result = session.end_turn();
        assert!(matches!(result, Err(SessionError::InvalidState { .. })));
        assert!(!session.participants()[0].has_completed);
    }

    #[test]
    fn rejections_alone_never_match() {
        let mut session = started(&["A", "B"], &["x"]);
        session.rate(&id("x"), Direction::Reject).unwrap();
        session.end_turn().unwrap();
        assert_eq!(
            session.rate(&id("x"), Direction::Reject).unwrap(),
            RateOutcome::Recorded
        );
        assert_eq!(session.status(), SessionStatus::Swiping);
    }
}
