//! MatchSession aggregate - the root of one pass-the-device session.
//!
//! Owns the roster, the shared pool, one shuffled queue per participant,
//! the rating log and the lifecycle status. Turn handling lives in
//! `turns.rs` and the post-match choices in `post_match.rs`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::domain::catalog::{participant_seed, shuffle_seeded, Item, Pool};
use crate::domain::foundation::{
    ItemId, ParticipantId, SessionId, SessionStatus, StateMachine, Timestamp,
};
use crate::domain::memory::SessionHistoryEntry;

use super::{ApprovalTally, Participant, Rating, SessionError, SessionEvent};

/// Smallest group that can reach a consensus.
pub const MIN_PARTICIPANTS: usize = 2;

/// The session aggregate root.
///
/// The cursor is shared: it always points into the active participant's
/// queue and goes back to zero whenever the active participant changes.
#[derive(Debug, Clone)]
pub struct MatchSession {
    pub(super) id: SessionId,
    pub(super) created_at: Timestamp,
    pub(super) status: SessionStatus,
    pub(super) participants: Vec<Participant>,
    pub(super) current_participant_index: usize,
    pub(super) matched_item: Option<Arc<Item>>,
    pub(super) pool: Pool,
    pub(super) participant_queues: HashMap<ParticipantId, Vec<Arc<Item>>>,
    pub(super) cursor: usize,
    pub(super) ratings: Vec<Rating>,
    pub(super) tally: ApprovalTally,
    /// Items the cursor has landed on this session.
    pub(super) shown: BTreeSet<ItemId>,
    pub(super) domain_events: Vec<SessionEvent>,
}

impl MatchSession {
    /// Creates an empty session in `Setup`.
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            created_at: Timestamp::now(),
            status: SessionStatus::Setup,
            participants: Vec::new(),
            current_participant_index: 0,
            matched_item: None,
            pool: Pool::default(),
            participant_queues: HashMap::new(),
            cursor: 0,
            ratings: Vec::new(),
            tally: ApprovalTally::new(),
            shown: BTreeSet::new(),
            domain_events: Vec::new(),
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Roster in turn order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn current_participant_index(&self) -> usize {
        self.current_participant_index
    }

    /// The match, present only while `Completed` after a consensus.
    pub fn matched_item(&self) -> Option<&Arc<Item>> {
        self.matched_item.as_ref()
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// The append-only rating log.
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Ids of every item shown so far, in id order.
    pub fn shown_item_ids(&self) -> &BTreeSet<ItemId> {
        &self.shown
    }

    /// The participant holding the device. Only set while swiping.
    pub fn active_participant(&self) -> Option<&Participant> {
        if !self.status.accepts_ratings() {
            return None;
        }
        self.participants.get(self.current_participant_index)
    }

    /// A participant's own shuffled queue.
    pub fn queue_for(&self, id: ParticipantId) -> Option<&[Arc<Item>]> {
        self.participant_queues.get(&id).map(Vec::as_slice)
    }

    /// The active participant's queue, empty when nobody is active.
    pub fn active_queue(&self) -> &[Arc<Item>] {
        self.active_participant()
            .and_then(|p| self.queue_for(p.id))
            .unwrap_or(&[])
    }

    /// The item under the cursor, `None` once the queue is exhausted.
    pub fn current_item(&self) -> Option<&Arc<Item>> {
        self.active_queue().get(self.cursor)
    }

    /// True when the active participant has moved past their last item.
    pub fn is_queue_exhausted(&self) -> bool {
        self.status.accepts_ratings() && self.cursor >= self.active_queue().len()
    }

    pub fn remaining_in_queue(&self) -> usize {
        self.active_queue().len().saturating_sub(self.cursor)
    }

    /// Resolves an item of this session's pool, retired ones included.
    pub fn item_by_id(&self, id: &ItemId) -> Option<&Arc<Item>> {
        self.pool.get(id)
    }

    pub fn can_start(&self, min_participants: usize) -> bool {
        self.participants.len() >= min_participants.max(MIN_PARTICIPANTS)
    }

    /// The ledger entry describing what this session showed.
    pub fn history_entry(&self) -> SessionHistoryEntry {
        SessionHistoryEntry::new(self.id, self.shown.clone())
    }

    /// Drains recorded domain events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.domain_events)
    }

    // ───────────────────────────────────────────────────────────────
    // Roster
    // ───────────────────────────────────────────────────────────────

    /// Adds a participant at the end of the turn order.
    ///
    /// # Errors
    ///
    /// - `InvalidState` outside `Setup`
    /// - `EmptyName` for a blank name
    /// - `DuplicateName` if the name is taken, ignoring case
    pub fn add_participant(&mut self, name: &str) -> Result<ParticipantId, SessionError> {
        self.require_roster_mutable("add a participant")?;

        let participant = Participant::new(name)?;
        if self.participants.iter().any(|p| p.has_name(&participant.name)) {
            return Err(SessionError::DuplicateName(participant.name));
        }

        let id = participant.id;
        self.record_event(SessionEvent::ParticipantAdded {
            session_id: self.id,
            participant_id: id,
            name: participant.name.clone(),
        });
        self.participants.push(participant);
        Ok(id)
    }

    /// Removes a participant, clamping the current index into range.
    pub fn remove_participant(&mut self, id: ParticipantId) -> Result<Participant, SessionError> {
        self.require_roster_mutable("remove a participant")?;

        let position = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or(SessionError::ParticipantNotFound(id))?;
        let removed = self.participants.remove(position);

        self.current_participant_index = self
            .current_participant_index
            .min(self.participants.len().saturating_sub(1));

        self.record_event(SessionEvent::ParticipantRemoved {
            session_id: self.id,
            participant_id: id,
        });
        Ok(removed)
    }

    // ───────────────────────────────────────────────────────────────
    // Lifecycle
    // ───────────────────────────────────────────────────────────────

    /// Enters `Swiping` under `session_id` with a freshly assembled pool.
    ///
    /// Valid from `Setup` (start) and `Completed` (replay with the same
    /// roster). Deals one queue per participant, each shuffled with the
    /// participant's own seed, so every queue holds the same items in a
    /// different order. Clears ratings and completion flags.
    ///
    /// # Errors
    ///
    /// - `NotEnoughParticipants` below `min_participants` (never below two)
    /// - `InvalidState` while already swiping
    /// - `EmptyPool` if `items` is empty
    pub fn begin_swiping(
        &mut self,
        session_id: SessionId,
        items: Vec<Item>,
        min_participants: usize,
    ) -> Result<(), SessionError> {
        let required = min_participants.max(MIN_PARTICIPANTS);
        if self.participants.len() < required {
            return Err(SessionError::NotEnoughParticipants {
                required,
                actual: self.participants.len(),
            });
        }
        let next_status = self
            .status
            .transition_to(SessionStatus::Swiping)
            .map_err(|_| SessionError::invalid_state("start swiping", self.status))?;

        let pool = Pool::new(items);
        if pool.is_empty() {
            return Err(SessionError::EmptyPool);
        }

        let replayed_from = (self.status == SessionStatus::Completed).then_some(self.id);
        let base: Vec<Arc<Item>> = pool.iter().cloned().collect();
        let seed = session_id.seed();

        self.participant_queues = self
            .participants
            .iter()
            .map(|p| (p.id, shuffle_seeded(&base, &participant_seed(&seed, p.id))))
            .collect();
        for participant in &mut self.participants {
            participant.has_completed = false;
        }

        self.id = session_id;
        self.created_at = Timestamp::now();
        self.status = next_status;
        self.pool = pool;
        self.current_participant_index = 0;
        self.cursor = 0;
        self.matched_item = None;
        self.ratings.clear();
        self.tally.clear();
        self.shown.clear();
        self.mark_current_shown();

        if let Some(previous_session_id) = replayed_from {
            self.record_event(SessionEvent::SessionReplayed {
                previous_session_id,
                session_id,
                kept_roster: true,
            });
        }
        self.record_event(SessionEvent::SessionStarted {
            session_id,
            participant_count: self.participants.len(),
            pool_size: self.pool.len(),
            started_at: self.created_at,
        });
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // Internal helpers
    // ───────────────────────────────────────────────────────────────

    pub(super) fn require_roster_mutable(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.status.is_roster_mutable() {
            Ok(())
        } else {
            Err(SessionError::invalid_state(operation, self.status))
        }
    }

    pub(super) fn require_swiping(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.status.accepts_ratings() {
            Ok(())
        } else {
            Err(SessionError::invalid_state(operation, self.status))
        }
    }

    /// Index of the active participant, checked against the roster.
    pub(super) fn active_index(&self) -> Result<usize, SessionError> {
        if self.participants.is_empty() {
            return Err(SessionError::NoActiveParticipant);
        }
        let index = self.current_participant_index;
        if index >= self.participants.len() {
            return Err(SessionError::invariant(format!(
                "participant index {} out of range for {} participants",
                index,
                self.participants.len()
            )));
        }
        Ok(index)
    }

    pub(super) fn transition(&mut self, target: SessionStatus) -> Result<(), SessionError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|e| SessionError::invariant(e.to_string()))?;
        Ok(())
    }

    /// Adds the item under the cursor to the shown set.
    pub(super) fn mark_current_shown(&mut self) {
        let current = self.current_item().map(|item| item.id.clone());
        if let Some(id) = current {
            self.shown.insert(id);
        }
    }

    pub(super) fn record_event(&mut self, event: SessionEvent) {
        self.domain_events.push(event);
    }
}

impl Default for MatchSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use std::collections::HashSet;

    fn items(ids: &[&str]) -> Vec<Item> {
        ids.iter()
            .map(|id| Item::new(*id, format!("Title {}", id), "Drama", 40, 7.5).unwrap())
            .collect()
    }

    fn session_with(names: &[&str]) -> MatchSession {
        let mut session = MatchSession::new();
        for name in names {
            session.add_participant(name).unwrap();
        }
        session
    }

    fn queue_ids(session: &MatchSession, id: ParticipantId) -> Vec<String> {
        session
            .queue_for(id)
            .unwrap()
            .iter()
            .map(|i| i.id.to_string())
            .collect()
    }

    #[test]
    fn new_session_is_in_setup() {
        let session = MatchSession::new();
        assert_eq!(session.status(), SessionStatus::Setup);
        assert!(session.participants().is_empty());
        assert!(session.active_participant().is_none());
    }

    #[test]
    fn add_participant_records_event() {
        let mut session = MatchSession::new();
        let id = session.add_participant("Ana").unwrap();

        let events = session.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            SessionEvent::ParticipantAdded { participant_id, name, .. }
                if *participant_id == id && name == "Ana"
        ));
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected_ignoring_case() {
        let mut session = session_with(&["Ana"]);
        let result = session.add_participant(" ana ");
        assert_eq!(result, Err(SessionError::DuplicateName("ana".to_string())));
        assert_eq!(session.participants().len(), 1);
    }

    #[test]
    fn remove_unknown_participant_fails() {
        let mut session = session_with(&["Ana"]);
        let ghost = ParticipantId::new();
        assert_eq!(
            session.remove_participant(ghost),
            Err(SessionError::ParticipantNotFound(ghost))
        );
    }

    #[test]
    fn remove_participant_clamps_index() {
        let mut session = session_with(&["Ana", "Ben"]);
        session.current_participant_index = 1;
        let ben = session.participants()[1].id;

        session.remove_participant(ben).unwrap();
        assert_eq!(session.current_participant_index(), 0);

        let ana = session.participants()[0].id;
        session.remove_participant(ana).unwrap();
        assert_eq!(session.current_participant_index(), 0);
    }

    #[test]
    fn starting_with_one_participant_is_refused_without_side_effects() {
        let mut session = session_with(&["Ana"]);
        let result = session.begin_swiping(SessionId::new(), items(&["x", "y"]), 2);

        assert_eq!(
            result,
            Err(SessionError::NotEnoughParticipants { required: 2, actual: 1 })
        );
        assert_eq!(session.status(), SessionStatus::Setup);
        assert!(session.participant_queues.is_empty());
        assert!(result.unwrap_err().is_advisory());
    }

    #[test]
    fn min_participants_never_drops_below_two() {
        let session = session_with(&["Ana"]);
        assert!(!session.can_start(1));
    }

    #[test]
    fn empty_pool_is_refused() {
        let mut session = session_with(&["Ana", "Ben"]);
        let result = session.begin_swiping(SessionId::new(), Vec::new(), 2);
        assert_eq!(result.unwrap_err().code(), ErrorCode::EmptyPool);
        assert_eq!(session.status(), SessionStatus::Setup);
    }

    #[test]
    fn begin_swiping_deals_same_content_in_distinct_orders() {
        let mut session = session_with(&["Ana", "Ben", "Cal"]);
        let session_id = SessionId::new();
        let ids = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
        session.begin_swiping(session_id, items(&ids), 2).unwrap();

        assert_eq!(session.id(), session_id);
        assert_eq!(session.status(), SessionStatus::Swiping);
        assert_eq!(session.current_participant_index(), 0);
        assert_eq!(session.cursor(), 0);

        let roster: Vec<ParticipantId> = session.participants().iter().map(|p| p.id).collect();
        let expected: HashSet<String> = ids.iter().map(|s| s.to_string()).collect();
        for id in &roster {
            let queue: HashSet<String> = queue_ids(&session, *id).into_iter().collect();
            assert_eq!(queue, expected);
        }
        assert_ne!(queue_ids(&session, roster[0]), queue_ids(&session, roster[1]));
    }

    #[test]
    fn queues_follow_participant_seeds() {
        let mut session = session_with(&["Ana", "Ben"]);
        let session_id = SessionId::new();
        let pool = items(&["a", "b", "c", "d", "e"]);
        session.begin_swiping(session_id, pool.clone(), 2).unwrap();

        let ana = session.participants()[0].id;
        let base: Vec<String> = pool.iter().map(|i| i.id.to_string()).collect();
        let expected = shuffle_seeded(&base, &participant_seed(&session_id.seed(), ana));
        assert_eq!(queue_ids(&session, ana), expected);
    }

    #[test]
    fn begin_swiping_marks_first_item_shown() {
        let mut session = session_with(&["Ana", "Ben"]);
        session.begin_swiping(SessionId::new(), items(&["x", "y", "z"]), 2).unwrap();

        let first = session.current_item().unwrap().id.clone();
        assert_eq!(session.shown_item_ids().len(), 1);
        assert!(session.shown_item_ids().contains(&first));
    }

    #[test]
    fn roster_is_frozen_while_swiping() {
        let mut session = session_with(&["Ana", "Ben"]);
        session.begin_swiping(SessionId::new(), items(&["x"]), 2).unwrap();

        let result = session.add_participant("Cal");
        assert!(matches!(result, Err(SessionError::InvalidState { .. })));
    }

    #[test]
    fn cannot_begin_twice() {
        let mut session = session_with(&["Ana", "Ben"]);
        session.begin_swiping(SessionId::new(), items(&["x"]), 2).unwrap();

        let result = session.begin_swiping(SessionId::new(), items(&["y"]), 2);
        assert!(matches!(result, Err(SessionError::InvalidState { .. })));
        assert!(session.item_by_id(&ItemId::from("x")).is_some());
    }

    #[test]
    fn active_index_out_of_range_is_an_invariant_violation() {
        let mut session = session_with(&["Ana", "Ben"]);
        session.current_participant_index = 5;
        let err = session.active_index().unwrap_err();
        assert!(!err.is_advisory());
    }
}
