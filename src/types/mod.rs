// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Reconstructed oracle records.
//!
//! These are the "current" views derived from the event log. None of them is
//! ever written by the upstream producer; they only exist as the result of
//! applying events.

pub mod id;
pub mod enums;
pub mod amount;
pub mod assertion;
pub mod dispute;
pub mod vote;

pub use assertion::Assertion;
pub use dispute::Dispute;
pub use enums::{AssertionStatus, DisputeStatus};
pub use vote::VoteEvent;
