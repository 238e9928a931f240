//! SessionEngine - the caller-facing surface of the consensus engine.
//!
//! Owns the current `MatchSession` and wires it to the content supplier
//! and the history ledger. Precondition failures come back as advisory
//! `SessionError`s and leave state untouched; the presentation layer reads
//! everything else back through the accessors.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::domain::catalog::Item;
use crate::domain::foundation::{
    Direction, DomainError, ItemId, ParticipantId, SessionId, SessionStatus,
};
use crate::domain::memory::{SessionHistoryEntry, SessionMemory, DEFAULT_HISTORY_WINDOW};
use crate::domain::session::{
    CelebrationWindow, MatchResolution, MatchSession, Participant, RateOutcome, SessionError,
    SessionEvent, SessionSummary, TurnOutcome, MIN_PARTICIPANTS,
};
use crate::ports::{ContentSupplier, HistoryRepository};

use super::PoolAssembler;

/// Tunables for a `SessionEngine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub min_participants: usize,
    pub history_window: usize,
    /// How long a match is celebrated before the summary shows on its own.
    pub celebration_delay: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_participants: MIN_PARTICIPANTS,
            history_window: DEFAULT_HISTORY_WINDOW,
            celebration_delay: Duration::from_secs(5),
        }
    }
}

impl From<&SessionConfig> for EngineSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            min_participants: config.min_participants,
            history_window: config.history_window,
            celebration_delay: config.celebration_delay(),
        }
    }
}

pub struct SessionEngine {
    session: MatchSession,
    assembler: PoolAssembler,
    history: Arc<dyn HistoryRepository>,
    memory: SessionMemory,
    settings: EngineSettings,
    celebration: Option<CelebrationWindow>,
    next_window_id: u64,
    last_refusal: Option<DomainError>,
    summary_visible: bool,
    events: Vec<SessionEvent>,
}

impl SessionEngine {
    pub fn new(
        supplier: Arc<dyn ContentSupplier>,
        history: Arc<dyn HistoryRepository>,
        settings: EngineSettings,
    ) -> Self {
        Self::with_assembler(PoolAssembler::new(supplier), history, settings)
    }

    pub fn with_assembler(
        assembler: PoolAssembler,
        history: Arc<dyn HistoryRepository>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            session: MatchSession::new(),
            assembler,
            history,
            memory: SessionMemory::new(settings.history_window),
            settings,
            celebration: None,
            next_window_id: 0,
            last_refusal: None,
            summary_visible: false,
            events: Vec::new(),
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn session(&self) -> &MatchSession {
        &self.session
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn active_participant(&self) -> Option<&Participant> {
        self.session.active_participant()
    }

    pub fn item_by_id(&self, id: &ItemId) -> Option<&Arc<Item>> {
        self.session.item_by_id(id)
    }

    pub fn current_item(&self) -> Option<&Arc<Item>> {
        self.session.current_item()
    }

    pub fn is_queue_exhausted(&self) -> bool {
        self.session.is_queue_exhausted()
    }

    pub fn remaining_in_queue(&self) -> usize {
        self.session.remaining_in_queue()
    }

    /// The open or most recent celebration window of this match.
    pub fn celebration(&self) -> Option<&CelebrationWindow> {
        self.celebration.as_ref()
    }

    /// Why the most recent operation was refused, cleared by the next
    /// operation that succeeds.
    pub fn last_refusal(&self) -> Option<&DomainError> {
        self.last_refusal.as_ref()
    }

    pub fn summary_visible(&self) -> bool {
        self.summary_visible
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_session(&self.session)
    }

    /// Drains events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.collect_events();
        std::mem::take(&mut self.events)
    }

    // ───────────────────────────────────────────────────────────────
    // Roster
    // ───────────────────────────────────────────────────────────────

    pub fn add_participant(&mut self, name: &str) -> Result<ParticipantId, SessionError> {
        let result = self.session.add_participant(name);
        self.settle("add participant", result)
    }

    pub fn remove_participant(&mut self, id: ParticipantId) -> Result<Participant, SessionError> {
        let result = self.session.remove_participant(id);
        self.settle("remove participant", result)
    }

    // ───────────────────────────────────────────────────────────────
    // Lifecycle
    // ───────────────────────────────────────────────────────────────

    /// Assembles a pool and enters `Swiping`.
    ///
    /// With fewer than the minimum participants this is a no-op that
    /// returns `NotEnoughParticipants`; nothing is fetched.
    pub async fn start_session(&mut self) -> Result<(), SessionError> {
        if self.session.status() != SessionStatus::Setup {
            let err = SessionError::invalid_state("start a session", self.session.status());
            return self.settle("start session", Err(err));
        }
        self.begin_round("start session").await
    }

    /// New session id, new seeds, same roster.
    pub async fn replay_same_participants(&mut self) -> Result<(), SessionError> {
        if self.session.status() != SessionStatus::Completed {
            let err = SessionError::invalid_state("replay a session", self.session.status());
            return self.settle("replay same participants", Err(err));
        }
        self.begin_round("replay same participants").await
    }

    /// Back to `Setup` with an empty roster under a new session id.
    pub fn replay_new_participants(&mut self) {
        let previous_session_id = self.session.id();
        self.replace_session();
        self.events.push(SessionEvent::SessionReplayed {
            previous_session_id,
            session_id: self.session.id(),
            kept_roster: false,
        });
        info!(
            previous_session_id = %previous_session_id,
            session_id = %self.session.id(),
            "Replaying with a new roster"
        );
    }

    /// Discards the session entirely.
    pub fn reset_session(&mut self) {
        let session_id = self.session.id();
        self.replace_session();
        self.events.push(SessionEvent::SessionReset { session_id });
        info!(session_id = %session_id, "Session reset");
    }

    // ───────────────────────────────────────────────────────────────
    // Turns
    // ───────────────────────────────────────────────────────────────

    pub async fn rate(
        &mut self,
        item_id: &ItemId,
        direction: Direction,
    ) -> Result<RateOutcome, SessionError> {
        let result = self.session.rate(item_id, direction);
        let outcome = self.settle("rate", result)?;

        if let RateOutcome::Matched(item) = &outcome {
            self.on_match(item).await;
        }
        Ok(outcome)
    }

    pub async fn end_turn(&mut self) -> Result<TurnOutcome, SessionError> {
        let result = self.session.end_turn();
        let outcome = self.settle("end turn", result)?;

        match &outcome {
            TurnOutcome::NextParticipant(next) => {
                debug!(session_id = %self.session.id(), next = %next, "Turn passed");
            }
            TurnOutcome::Matched(item) => self.on_match(item).await,
            TurnOutcome::RoundExhausted => {
                info!(session_id = %self.session.id(), "Round finished without a match");
                self.record_history().await;
                self.summary_visible = true;
            }
        }
        Ok(outcome)
    }

    // ───────────────────────────────────────────────────────────────
    // Post-match
    // ───────────────────────────────────────────────────────────────

    /// Skips the match and keeps rating the rest of the pool.
    pub fn continue_after_match(&mut self) -> Result<Arc<Item>, SessionError> {
        let result = self.session.continue_after_match();
        let item = self.settle("continue after match", result)?;
        self.close_celebration(MatchResolution::KeepLooking);
        self.summary_visible = false;
        Ok(item)
    }

    /// Takes the match back and resumes where it was found.
    pub fn undo_match_and_continue(&mut self) -> Result<Arc<Item>, SessionError> {
        let result = self.session.undo_match_and_continue();
        let item = self.settle("undo match", result)?;
        self.close_celebration(MatchResolution::GoBack);
        self.summary_visible = false;
        Ok(item)
    }

    /// Accepts the match ("we're done") and shows the summary.
    pub fn finish(&mut self) -> Result<(), SessionError> {
        if self.session.status() != SessionStatus::Completed {
            let err = SessionError::invalid_state("finish", self.session.status());
            return self.settle("finish", Err(err));
        }
        self.close_celebration(MatchResolution::Finish);
        self.summary_visible = true;
        Ok(())
    }

    /// Applies a user's choice from the celebration screen.
    pub fn resolve_celebration(&mut self, resolution: MatchResolution) -> Result<(), SessionError> {
        match resolution {
            MatchResolution::Finish => self.finish(),
            MatchResolution::KeepLooking => self.continue_after_match().map(|_| ()),
            MatchResolution::GoBack => self.undo_match_and_continue().map(|_| ()),
        }
    }

    /// Timer path: finishes window `window_id` unless something already
    /// resolved it. Returns true if the timer won.
    pub fn auto_finish(&mut self, window_id: u64) -> bool {
        let Some(window) = self.celebration.as_mut() else {
            return false;
        };
        if window.id() != window_id || !window.resolve(MatchResolution::Finish) {
            debug!(window_id, "Celebration already resolved, timer ignored");
            return false;
        }

        self.summary_visible = true;
        debug!(session_id = %self.session.id(), window_id, "Celebration timed out");
        true
    }

    // ───────────────────────────────────────────────────────────────
    // Internal helpers
    // ───────────────────────────────────────────────────────────────

    async fn begin_round(&mut self, operation: &'static str) -> Result<(), SessionError> {
        if !self.session.can_start(self.settings.min_participants) {
            let err = SessionError::NotEnoughParticipants {
                required: self.settings.min_participants.max(MIN_PARTICIPANTS),
                actual: self.session.participants().len(),
            };
            return self.settle(operation, Err(err));
        }

        let session_id = SessionId::new();
        let history = self.load_history().await;
        let exclude = self.memory.exclusion_set(&history);
        let items = match self.assembler.assemble(&session_id.seed(), &exclude).await {
            Ok(items) => items,
            Err(e) => return self.settle(operation, Err(e)),
        };

        let result = self
            .session
            .begin_swiping(session_id, items, self.settings.min_participants);
        self.settle(operation, result)?;

        self.celebration = None;
        self.summary_visible = false;
        info!(
            session_id = %session_id,
            participants = self.session.participants().len(),
            pool_size = self.session.pool().len(),
            excluded = exclude.len(),
            "Swiping started"
        );
        Ok(())
    }

    async fn on_match(&mut self, item: &Arc<Item>) {
        info!(
            session_id = %self.session.id(),
            item_id = %item.id,
            title = %item.title,
            "Match found"
        );
        self.record_history().await;

        self.next_window_id += 1;
        self.celebration = Some(CelebrationWindow::open(self.next_window_id, item.id.clone()));
        self.summary_visible = false;
    }

    fn close_celebration(&mut self, resolution: MatchResolution) {
        if let Some(window) = self.celebration.as_mut() {
            window.resolve(resolution);
        }
    }

    fn replace_session(&mut self) {
        self.collect_events();
        self.session = MatchSession::new();
        self.celebration = None;
        self.summary_visible = false;
    }

    async fn load_history(&self) -> Vec<SessionHistoryEntry> {
        match self.history.load_history().await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "Failed to load session history, treating it as empty");
                Vec::new()
            }
        }
    }

    /// Appends this session's shown items to the ledger. Save failures are
    /// logged; the in-memory session stays authoritative.
    async fn record_history(&mut self) {
        let entry = self.session.history_entry();
        let shown = entry.shown_item_ids.len();
        let history = self.load_history().await;
        let updated = self.memory.record(entry, history);

        match self.history.save_history(&updated).await {
            Ok(()) => debug!(
                session_id = %self.session.id(),
                shown,
                entries = updated.len(),
                "Session history recorded"
            ),
            Err(e) => warn!(
                session_id = %self.session.id(),
                error = %e,
                "Failed to save session history"
            ),
        }
    }

    fn collect_events(&mut self) {
        self.events.extend(self.session.take_events());
    }

    /// Logs refused operations and gathers any events they recorded.
    fn settle<T>(
        &mut self,
        operation: &'static str,
        result: Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        self.collect_events();
        self.last_refusal = match &result {
            Ok(_) => None,
            Err(e) => {
                let report = DomainError::from(e.clone());
                if report.code.is_advisory() {
                    warn!(
                        session_id = %self.session.id(),
                        operation,
                        code = %report.code,
                        details = ?report.details,
                        error = %report.message,
                        "Operation refused"
                    );
                } else {
                    error!(
                        session_id = %self.session.id(),
                        operation,
                        details = ?report.details,
                        error = %report.message,
                        "Session invariant violated"
                    );
                }
                Some(report)
            }
        };
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::StaticCatalog;
    use crate::adapters::storage::InMemoryHistoryStore;
    use crate::domain::foundation::ErrorCode;

    fn items(ids: &[&str]) -> Vec<Item> {
        ids.iter()
            .map(|id| Item::new(*id, format!("Title {}", id), "Drama", 40, 7.0).unwrap())
            .collect()
    }

    fn engine_with(ids: &[&str]) -> (SessionEngine, InMemoryHistoryStore) {
        let store = InMemoryHistoryStore::new();
        let engine = SessionEngine::new(
            Arc::new(StaticCatalog::with_items(items(ids))),
            Arc::new(store.clone()),
            EngineSettings::default(),
        );
        (engine, store)
    }

    async fn started(ids: &[&str]) -> (SessionEngine, InMemoryHistoryStore) {
        let (mut engine, store) = engine_with(ids);
        engine.add_participant("Ana").unwrap();
        engine.add_participant("Ben").unwrap();
        engine.start_session().await.unwrap();
        (engine, store)
    }

    async fn match_on(engine: &mut SessionEngine, id: &str) {
        let item = ItemId::from(id);
        engine.rate(&item, Direction::Approve).await.unwrap();
        engine.end_turn().await.unwrap();
        let outcome = engine.rate(&item, Direction::Approve).await.unwrap();
        assert!(matches!(outcome, RateOutcome::Matched(_)));
    }

    #[tokio::test]
    async fn start_with_one_participant_is_a_no_op() {
        let (mut engine, store) = engine_with(&["x"]);
        engine.add_participant("Solo").unwrap();

        let result = engine.start_session().await;

        assert!(matches!(result, Err(SessionError::NotEnoughParticipants { .. })));
        assert_eq!(engine.status(), SessionStatus::Setup);
        let refusal = engine.last_refusal().unwrap();
        assert_eq!(refusal.code, ErrorCode::NotEnoughParticipants);
        assert_eq!(refusal.details.get("actual"), Some(&"1".to_string()));
        assert!(engine.session().queue_for(engine.session().participants()[0].id).is_none());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn successful_operation_clears_the_last_refusal() {
        let (mut engine, _) = engine_with(&["x"]);
        engine.add_participant("Ana").unwrap();
        assert!(engine.add_participant("ana").is_err());
        assert_eq!(engine.last_refusal().unwrap().code, ErrorCode::DuplicateName);

        engine.add_participant("Ben").unwrap();
        assert!(engine.last_refusal().is_none());
    }

    #[tokio::test]
    async fn match_records_history_and_opens_celebration() {
        let (mut engine, store) = started(&["x", "y"]).await;
        match_on(&mut engine, "x").await;

        assert_eq!(engine.status(), SessionStatus::Completed);
        assert_eq!(store.save_count(), 1);
        let window = engine.celebration().unwrap();
        assert_eq!(window.item_id(), &ItemId::from("x"));
        assert!(!window.is_resolved());
        assert!(!engine.summary_visible());
    }

    #[tokio::test]
    async fn user_choice_beats_the_timer() {
        let (mut engine, _) = started(&["x", "y"]).await;
        match_on(&mut engine, "x").await;
        let window_id = engine.celebration().unwrap().id();

        engine.continue_after_match().unwrap();

        assert!(!engine.auto_finish(window_id));
        assert!(!engine.summary_visible());
        assert_eq!(engine.status(), SessionStatus::Swiping);
    }

    #[tokio::test]
    async fn timer_finishes_an_open_window_once() {
        let (mut engine, _) = started(&["x", "y"]).await;
        match_on(&mut engine, "x").await;
        let window_id = engine.celebration().unwrap().id();

        assert!(engine.auto_finish(window_id));
        assert!(engine.summary_visible());
        assert!(!engine.auto_finish(window_id));
        assert_eq!(
            engine.celebration().unwrap().resolution(),
            Some(MatchResolution::Finish)
        );
    }

    #[tokio::test]
    async fn stale_timer_is_ignored() {
        let (mut engine, _) = started(&["x", "y"]).await;
        match_on(&mut engine, "x").await;
        let first_window = engine.celebration().unwrap().id();
        engine.undo_match_and_continue().unwrap();

        assert!(!engine.auto_finish(first_window + 1));
        assert!(!engine.auto_finish(first_window));
    }

    #[tokio::test]
    async fn round_exhaustion_shows_summary_and_records_history() {
        let (mut engine, store) = started(&["x"]).await;
        engine.rate(&ItemId::from("x"), Direction::Reject).await.unwrap();
        engine.end_turn().await.unwrap();
        engine.rate(&ItemId::from("x"), Direction::Reject).await.unwrap();

        assert_eq!(engine.end_turn().await.unwrap(), TurnOutcome::RoundExhausted);
        assert!(engine.summary_visible());
        assert!(engine.celebration().is_none());

        let history = store.entries().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].session_id, engine.session().id());
    }

    #[tokio::test]
    async fn history_save_failure_does_not_fail_the_rating() {
        let (mut engine, store) = started(&["x"]).await;
        store.set_fail_saves(true);

        match_on(&mut engine, "x").await;
        assert_eq!(engine.status(), SessionStatus::Completed);
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn replay_keeps_roster_with_a_new_id() {
        let (mut engine, _) = started(&["x", "y"]).await;
        match_on(&mut engine, "x").await;
        let first_id = engine.session().id();
        engine.take_events();

        engine.replay_same_participants().await.unwrap();

        assert_ne!(engine.session().id(), first_id);
        assert_eq!(engine.session().participants().len(), 2);
        assert_eq!(engine.status(), SessionStatus::Swiping);
        assert!(engine.session().ratings().is_empty());
        assert!(engine
            .take_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::SessionReplayed { kept_roster: true, .. })));
    }

    #[tokio::test]
    async fn replay_requires_a_completed_session() {
        let (mut engine, _) = started(&["x"]).await;
        let result = engine.replay_same_participants().await;
        assert!(matches!(result, Err(SessionError::InvalidState { .. })));
        assert_eq!(engine.status(), SessionStatus::Swiping);
    }

    #[tokio::test]
    async fn replay_new_participants_returns_to_empty_setup() {
        let (mut engine, _) = started(&["x"]).await;
        engine.replay_new_participants();

        assert_eq!(engine.status(), SessionStatus::Setup);
        assert!(engine.session().participants().is_empty());
    }

    #[tokio::test]
    async fn reset_discards_everything() {
        let (mut engine, _) = started(&["x"]).await;
        let old_id = engine.session().id();
        engine.reset_session();

        assert_eq!(engine.status(), SessionStatus::Setup);
        assert!(engine.session().participants().is_empty());
        let events = engine.take_events();
        assert!(matches!(
            events.last(),
            Some(SessionEvent::SessionReset { session_id }) if *session_id == old_id
        ));
    }

    #[tokio::test]
    async fn finish_requires_completion() {
        let (mut engine, _) = started(&["x"]).await;
        assert!(engine.finish().is_err());
        assert!(!engine.summary_visible());
    }
}
