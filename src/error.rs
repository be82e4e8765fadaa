// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Amount text is not an unsigned decimal integer.
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),
    /// Status text does not name a known lifecycle state.
    #[error("invalid status: {0:?}")]
    InvalidStatus(String),
}

/// Failure to turn a raw log record into a [`TypedEvent`](crate::event::TypedEvent).
///
/// Both variants mean "skip this event", never "stop the replay".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown event type {0:?}")]
    UnknownEventType(String),

    #[error("malformed {event_type} payload: {reason}")]
    Schema { event_type: &'static str, reason: String },
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;
