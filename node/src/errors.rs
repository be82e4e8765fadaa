// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use thiserror::Error;

/// Read/write failure in an event log or state store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A replay that could not even start scanning.
///
/// Per-event failures never surface here; they are counted in the report.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Failed to read events {from_block}..={to_block} for {instance_id}: {source}")]
    Fetch {
        instance_id: String,
        from_block: u64,
        to_block: u64,
        #[source]
        source: StoreError,
    },
}

/// Failure talking to an instance lane.
#[derive(Error, Debug)]
pub enum LaneError {
    #[error("Lane for instance {0} is closed")]
    Closed(String),

    #[error("Lane for instance {0} dropped the reply")]
    NoReply(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Replay(#[from] ReplayError),
}
