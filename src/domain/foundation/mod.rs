//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the consensus domain.

mod direction;
mod errors;
mod ids;
mod session_status;
mod state_machine;
mod timestamp;

pub use direction::Direction;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ItemId, ParticipantId, RatingId, SessionId};
pub use session_status::SessionStatus;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
