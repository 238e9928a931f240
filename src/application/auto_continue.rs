//! Celebration timer.
//!
//! After a match the engine opens a celebration window. If nobody chooses
//! within the configured delay, the timer finishes the session. The engine
//! decides the race: whichever of the timer and the user resolves the
//! window first wins, the other becomes a no-op.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use super::SessionEngine;

/// An engine shared between the input loop and background timers.
pub type SharedEngine = Arc<Mutex<SessionEngine>>;

/// Arms the auto-finish timer for celebration window `window_id`.
///
/// The handle resolves to true if the timer finished the session.
pub fn schedule_auto_finish(
    engine: SharedEngine,
    window_id: u64,
    delay: Duration,
) -> JoinHandle<bool> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let fired = engine.lock().await.auto_finish(window_id);
        debug!(window_id, fired, "Celebration timer elapsed");
        fired
    })
}

/// Arms the timer for the engine's open celebration window, if any.
pub async fn arm_celebration_timer(engine: &SharedEngine) -> Option<JoinHandle<bool>> {
    let (window_id, delay) = {
        let guard = engine.lock().await;
        let window = guard.celebration().filter(|w| !w.is_resolved())?;
        (window.id(), guard.settings().celebration_delay)
    };
    Some(schedule_auto_finish(Arc::clone(engine), window_id, delay))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::StaticCatalog;
    use crate::adapters::storage::InMemoryHistoryStore;
    use crate::application::EngineSettings;
    use crate::domain::catalog::Item;
    use crate::domain::foundation::{Direction, ItemId, SessionStatus};

    async fn matched_engine(delay: Duration) -> SharedEngine {
        let items = vec![
            Item::new("x", "Title x", "Drama", 40, 7.0).unwrap(),
            Item::new("y", "Title y", "Drama", 40, 7.0).unwrap(),
        ];
        let settings = EngineSettings {
            celebration_delay: delay,
            ..Default::default()
        };
        let mut engine = SessionEngine::new(
            Arc::new(StaticCatalog::with_items(items)),
            Arc::new(InMemoryHistoryStore::new()),
            settings,
        );
        engine.add_participant("Ana").unwrap();
        engine.add_participant("Ben").unwrap();
        engine.start_session().await.unwrap();

        let x = ItemId::from("x");
        engine.rate(&x, Direction::Approve).await.unwrap();
        engine.end_turn().await.unwrap();
        engine.rate(&x, Direction::Approve).await.unwrap();
        assert_eq!(engine.status(), SessionStatus::Completed);

        Arc::new(Mutex::new(engine))
    }

    #[tokio::test]
    async fn timer_finishes_when_nobody_chooses() {
        let engine = matched_engine(Duration::from_millis(10)).await;

        let handle = arm_celebration_timer(&engine).await.unwrap();

        assert!(handle.await.unwrap());
        assert!(engine.lock().await.summary_visible());
    }

    #[tokio::test]
    async fn user_choice_before_the_timer_wins() {
        let engine = matched_engine(Duration::from_millis(50)).await;
        let handle = arm_celebration_timer(&engine).await.unwrap();

        engine.lock().await.continue_after_match().unwrap();

        assert!(!handle.await.unwrap());
        let guard = engine.lock().await;
        assert_eq!(guard.status(), SessionStatus::Swiping);
        assert!(!guard.summary_visible());
    }

    #[tokio::test]
    async fn no_timer_without_an_open_window() {
        let engine = matched_engine(Duration::from_millis(10)).await;
        engine.lock().await.finish().unwrap();

        assert!(arm_celebration_timer(&engine).await.is_none());
    }
}
