//! Direction of a single rating.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a participant approved or rejected an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Swipe right.
    Approve,
    /// Swipe left.
    Reject,
}

impl Direction {
    pub fn is_approve(&self) -> bool {
        matches!(self, Direction::Approve)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Approve => "Approve",
            Direction::Reject => "Reject",
        };
        write!(f, "{}", s)
    }
}
