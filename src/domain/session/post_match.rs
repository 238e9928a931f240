//! Post-match choices: keep looking past the match, or take it back.

use std::sync::Arc;

use tracing::debug;

use crate::domain::catalog::Item;
use crate::domain::foundation::SessionStatus;

use super::{ApprovalTally, MatchSession, SessionError, SessionEvent};

impl MatchSession {
    /// Drops the match from every queue and restarts the round.
    ///
    /// The session id is kept. The matched item is retired from the pool
    /// so it can neither be rated nor matched again.
    pub fn continue_after_match(&mut self) -> Result<Arc<Item>, SessionError> {
        let item = self.require_match("continue after a match")?;
        self.transition(SessionStatus::Swiping)?;

        self.pool.retire(&item.id);
        for queue in self.participant_queues.values_mut() {
            queue.retain(|queued| queued.id != item.id);
        }
        for participant in &mut self.participants {
            participant.has_completed = false;
        }
        self.current_participant_index = 0;
        self.cursor = 0;
        self.matched_item = None;
        self.mark_current_shown();

        self.record_event(SessionEvent::MatchContinued {
            session_id: self.id,
            item_id: item.id.clone(),
        });
        debug!(session_id = %self.id, item_id = %item.id, "Continuing past match");
        Ok(item)
    }

    /// Retracts the approvals that produced the match and resumes rating
    /// exactly where it stopped.
    ///
    /// Only approvals of the matched item are removed; rejections and
    /// ratings of other items stay. Queues and the cursor are untouched.
    pub fn undo_match_and_continue(&mut self) -> Result<Arc<Item>, SessionError> {
        let item = self.require_match("undo a match")?;
        self.transition(SessionStatus::Swiping)?;

        let before = self.ratings.len();
        self.ratings.retain(|rating| !rating.approves(&item.id));
        let retracted_ratings = before - self.ratings.len();
        self.tally = ApprovalTally::from_ratings(&self.ratings);

        let current = self.current_participant_index;
        for (index, participant) in self.participants.iter_mut().enumerate() {
            participant.has_completed = index < current;
        }
        self.matched_item = None;
        self.mark_current_shown();

        self.record_event(SessionEvent::MatchUndone {
            session_id: self.id,
            item_id: item.id.clone(),
            retracted_ratings,
        });
        debug!(
            session_id = %self.id,
            item_id = %item.id,
            retracted_ratings,
            "Match undone"
        );
        Ok(item)
    }

    fn require_match(&self, operation: &'static str) -> Result<Arc<Item>, SessionError> {
        if self.status != SessionStatus::Completed {
            return Err(SessionError::invalid_state(operation, self.status));
        }
        self.matched_item.clone().ok_or(SessionError::NoMatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Direction, ItemId, SessionId};
    use crate::domain::session::{RateOutcome, TurnOutcome};

    fn id(s: &str) -> ItemId {
        ItemId::from(s)
    }

    /// A and B both approve x; A also rejects y and approves z first.
    fn matched_session() -> MatchSession {
        let mut session = MatchSession::new();
        session.add_participant("A").unwrap();
        session.add_participant("B").unwrap();
        let items = ["x", "y", "z"]
            .iter()
            .map(|s| Item::new(*s, s.to_uppercase(), "Drama", 50, 8.0).unwrap())
            .collect();
        session.begin_swiping(SessionId::new(), items, 2).unwrap();

        session.rate(&id("x"), Direction::Approve).unwrap();
        session.rate(&id("y"), Direction::Reject).unwrap();
        session.rate(&id("z"), Direction::Approve).unwrap();
        session.end_turn().unwrap();
        session.rate(&id("y"), Direction::Approve).unwrap();
        assert!(matches!(
            session.rate(&id("x"), Direction::Approve).unwrap(),
            RateOutcome::Matched(_)
        ));
        session.take_events();
        session
    }

    #[test]
    fn continue_removes_match_from_every_queue() {
        let mut session = matched_session();
        let original_id = session.id();

        let item = session.continue_after_match().unwrap();
        assert_eq!(item.id, id("x"));
        assert_eq!(session.status(), SessionStatus::Swiping);
        assert_eq!(session.id(), original_id);
        assert_eq!(session.current_participant_index(), 0);
        assert_eq!(session.cursor(), 0);
        assert!(session.matched_item().is_none());
        assert!(session.participants().iter().all(|p| !p.has_completed));

        for participant in session.participants() {
            let queue = session.queue_for(participant.id).unwrap();
            assert_eq!(queue.len(), 2);
            assert!(queue.iter().all(|i| i.id != id("x")));
        }
    }

    #[test]
    fn continued_match_cannot_match_again() {
        let mut session = matched_session();
        session.continue_after_match().unwrap();

        let result = session.rate(&id("x"), Direction::Approve);
        assert_eq!(result, Err(SessionError::UnknownItem(id("x"))));
        assert!(session.item_by_id(&id("x")).is_some());
    }

    #[test]
    fn continue_finds_the_next_consensus() {
        let mut session = matched_session();
        session.continue_after_match().unwrap();

        // A approved z before the first match; B approving z completes it.
        session.end_turn().unwrap();
        let outcome = session.rate(&id("z"), Direction::Approve).unwrap();
        assert_eq!(outcome, RateOutcome::Matched(Arc::clone(session.item_by_id(&id("z")).unwrap())));
    }

    #[test]
    fn undo_removes_only_approvals_of_the_match() {
        let mut session = matched_session();
        let before: Vec<_> = session
            .ratings()
            .iter()
            .filter(|r| r.item_id != id("x"))
            .cloned()
            .collect();

        session.undo_match_and_continue().unwrap();

        assert!(session.ratings().iter().all(|r| !r.approves(&id("x"))));
        assert_eq!(session.ratings().to_vec(), before);
        assert_eq!(session.status(), SessionStatus::Swiping);
        assert!(session.matched_item().is_none());
    }

    #[test]
    fn undo_keeps_rejections_of_the_match() {
        let mut session = MatchSession::new();
        session.add_participant("A").unwrap();
        session.add_participant("B").unwrap();
        session.add_participant("C").unwrap();
        let items = vec![Item::new("x", "X", "Drama", 50, 8.0).unwrap()];
        session.begin_swiping(SessionId::new(), items, 2).unwrap();

        session.rate(&id("x"), Direction::Reject).unwrap();
        session.rate(&id("x"), Direction::Approve).unwrap();
        session.end_turn().unwrap();
        session.rate(&id("x"), Direction::Approve).unwrap();
        session.end_turn().unwrap();
        session.rate(&id("x"), Direction::Approve).unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);

        session.undo_match_and_continue().unwrap();
        assert_eq!(session.ratings().len(), 1);
        assert_eq!(session.ratings()[0].direction, Direction::Reject);
    }

    #[test]
    fn undo_resumes_at_the_matching_participant() {
        let mut session = matched_session();
        let cursor = session.cursor();

        session.undo_match_and_continue().unwrap();

        assert_eq!(session.current_participant_index(), 1);
        assert_eq!(session.cursor(), cursor);
        assert!(session.participants()[0].has_completed);
        assert!(!session.participants()[1].has_completed);
        assert_eq!(session.queue_for(session.participants()[1].id).unwrap().len(), 3);
    }

    #[test]
    fn undo_retracts_every_participants_approval() {
        let mut session = matched_session();
        session.undo_match_and_continue().unwrap();

        // B re-approves, but A's approval was retracted too.
        assert_eq!(
            session.rate(&id("x"), Direction::Approve).unwrap(),
            RateOutcome::Recorded
        );
        assert_eq!(session.end_turn().unwrap(), TurnOutcome::RoundExhausted);
    }

    #[test]
    fn post_match_actions_need_a_match() {
        let mut session = MatchSession::new();
        assert!(matches!(
            session.continue_after_match(),
            Err(SessionError::InvalidState { .. })
        ));

        session.add_participant("A").unwrap();
        session.add_participant("B").unwrap();
        let items = vec![Item::new("x", "X", "Drama", 50, 8.0).unwrap()];
        session.begin_swiping(SessionId::new(), items, 2).unwrap();
        session.end_turn().unwrap();
        assert_eq!(session.end_turn().unwrap(), TurnOutcome::RoundExhausted);

        assert_eq!(session.undo_match_and_continue(), Err(SessionError::NoMatch));
        assert_eq!(session.status(), SessionStatus::Completed);
    }
}
