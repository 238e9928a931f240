//! SessionStatus enum for tracking the lifecycle of a swiping session.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of a swiping session.
///
/// `Setup` edits the roster, `Swiping` accepts ratings, `Completed` holds
/// either a match or an exhausted round. A completed session only returns
/// to `Swiping` through the post-match actions; replays start a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Setup,
    Swiping,
    Completed,
}

impl SessionStatus {
    /// Returns true if participants may be added or removed.
    pub fn is_roster_mutable(&self) -> bool {
        matches!(self, SessionStatus::Setup)
    }

    /// Returns true if ratings and turn changes are accepted.
    pub fn accepts_ratings(&self) -> bool {
        matches!(self, SessionStatus::Swiping)
    }
}

impl StateMachine for SessionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Setup, Swiping) | (Swiping, Completed) | (Completed, Swiping)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            Setup => vec![Swiping],
            Swiping => vec![Completed],
            Completed => vec![Swiping],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Setup => "Setup",
            SessionStatus::Swiping => "Swiping",
            SessionStatus::Completed => "Completed",
        };
        write!(f, "{}", s)
    }
}
