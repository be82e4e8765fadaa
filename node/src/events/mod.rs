// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Event-Sourced Reconciliation
//!
//! The oracle event log is the only source of truth. Assertions, disputes
//! and tallies are derived views that can be rebuilt from it at any time.
//!
//! # Flow
//! 1. `EventLog::read_range` returns events in `(block, log index, id)` order
//! 2. Checksums are verified; mismatches are skipped, never applied
//! 3. `EventApplier` decodes and dispatches to one handler per kind
//! 4. Handlers upsert into the `StateStore`; votes trigger a full recount
//!
//! # Guarantees
//! - Re-applying an event converges to the same state
//! - A bad event costs one event, never the range
//! - Live ingestion and replay share the same apply path

pub mod event_log;
pub mod event_apply;
pub mod event_replay;

pub use event_apply::EventApplier;
pub use event_log::{EventLog, MemoryEventLog};
pub use event_replay::{BlockChunks, EventOutcome, ReplayEngine, ReplayReport};
