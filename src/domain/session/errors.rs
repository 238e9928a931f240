//! Session-specific error types.

use thiserror::Error;

use crate::domain::foundation::{
    DomainError, ErrorCode, ItemId, ParticipantId, SessionStatus,
};

/// Errors raised by the session aggregate.
///
/// Everything except `Invariant` is a precondition failure: the operation
/// was refused and the session was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Need at least {required} participants to start, have {actual}")]
    NotEnoughParticipants { required: usize, actual: usize },

    #[error("Cannot {operation} while the session is {status}")]
    InvalidState {
        operation: &'static str,
        status: SessionStatus,
    },

    #[error("No participant is currently rating")]
    NoActiveParticipant,

    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    #[error("A participant named '{0}' is already in the session")]
    DuplicateName(String),

    #[error("Participant name cannot be empty")]
    EmptyName,

    #[error("Item is not a live candidate in this session: {0}")]
    UnknownItem(ItemId),

    #[error("The session has no matched item")]
    NoMatch,

    #[error("No content is available to build a pool")]
    EmptyPool,

    #[error("Session state is inconsistent: {0}")]
    Invariant(String),
}

impl SessionError {
    pub fn invalid_state(operation: &'static str, status: SessionStatus) -> Self {
        SessionError::InvalidState { operation, status }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        SessionError::Invariant(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotEnoughParticipants { .. } => ErrorCode::NotEnoughParticipants,
            SessionError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            SessionError::NoActiveParticipant => ErrorCode::NoActiveParticipant,
            SessionError::ParticipantNotFound(_) => ErrorCode::ParticipantNotFound,
            SessionError::DuplicateName(_) => ErrorCode::DuplicateName,
            SessionError::EmptyName => ErrorCode::EmptyField,
            SessionError::UnknownItem(_) => ErrorCode::ItemNotFound,
            SessionError::NoMatch => ErrorCode::NoMatch,
            SessionError::EmptyPool => ErrorCode::EmptyPool,
            SessionError::Invariant(_) => ErrorCode::InternalError,
        }
    }

    /// Returns true if the caller can treat the failure as a no-op.
    pub fn is_advisory(&self) -> bool {
        self.code().is_advisory()
    }
}

impl From<SessionError> for DomainError {
    fn from(err: SessionError) -> Self {
        let domain = DomainError::new(err.code(), err.to_string());
        match &err {
            SessionError::NotEnoughParticipants { required, actual } => domain
                .with_detail("required", required.to_string())
                .with_detail("actual", actual.to_string()),
            SessionError::ParticipantNotFound(id) => {
                domain.with_detail("participant_id", id.to_string())
            }
            SessionError::UnknownItem(id) => domain.with_detail("item_id", id.to_string()),
            SessionError::DuplicateName(name) => domain.with_detail("name", name.clone()),
            SessionError::InvalidState { status, .. } => {
                domain.with_detail("status", status.to_string())
            }
            _ => domain,
        }
    }
}
