//! Session domain module.
//!
//! The pass-the-device engine core: roster, lifecycle, turns, consensus
//! and the post-match choices.
//!
//! # Events
//!
//! The `MatchSession` aggregate records `SessionEvent`s as it changes;
//! callers drain them with `take_events()`.

mod aggregate;
mod celebration;
mod consensus;
mod errors;
mod events;
mod participant;
mod post_match;
mod rating;
mod summary;
mod turns;

pub use aggregate::{MatchSession, MIN_PARTICIPANTS};
pub use celebration::{CelebrationWindow, MatchResolution};
pub use consensus::{check_consensus, ApprovalTally};
pub use errors::SessionError;
pub use events::SessionEvent;
pub use participant::Participant;
pub use rating::Rating;
pub use summary::{ItemApprovals, ParticipantSummary, SessionSummary, TOP_ITEMS};
pub use turns::{RateOutcome, TurnOutcome};
