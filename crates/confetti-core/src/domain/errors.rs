//! Error types and their operational classification.
//!
//! Every core operation returns `Result<_, CoreError>`. The command layer maps
//! `CoreError::kind()` to user-facing text once, centrally.

use thiserror::Error;

use super::ids::{CommunityId, UserId};
use super::policy::DenyReason;

/// ErrorKind classifies a failure for the caller.
///
/// - InvalidDate / NotFound / Unauthorized: reported to the caller, non-fatal.
/// - Transport: cycle-local, logged.
/// - StoreUnavailable: fatal to the current operation or cycle only.
/// - CycleInProgress: a manual trigger collided with a running cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidDate,
    NotFound,
    Unauthorized,
    Transport,
    StoreUnavailable,
    CycleInProgress,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid calendar date: month={month} day={day}")]
    InvalidDate { month: u32, day: u32 },

    #[error("no birthday stored for {0}")]
    NotFound(UserId),

    #[error("unauthorized: {0}")]
    Unauthorized(DenyReason),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("no notification channel resolvable for {0}")]
    ChannelUnresolved(CommunityId),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("a notification cycle is already in progress")]
    CycleInProgress,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidDate { .. } => ErrorKind::InvalidDate,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::Unauthorized(_) => ErrorKind::Unauthorized,
            CoreError::Transport(_) | CoreError::ChannelUnresolved(_) => ErrorKind::Transport,
            CoreError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            CoreError::CycleInProgress => ErrorKind::CycleInProgress,
        }
    }
}

/// Failure reported by the chat transport (send or lookup).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
