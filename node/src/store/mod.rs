// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! State Store
//!
//! One contract, two backends:
//! - [`MemoryStateStore`]: bounded per-instance maps, least-recently-updated eviction
//! - [`SqliteStore`]: relational tables keyed by `(instance_id, id)`, no eviction
//!
//! # Contract
//! - `put_assertion` / `put_dispute` are idempotent upserts keyed by `id`
//! - `put_vote_event` appends; re-delivering the same on-chain vote
//!   (same block, log index and tx hash) leaves the store unchanged
//! - `vote_events` returns votes in `(block_number, log_index)` order
//! - every operation is scoped to one instance; instances never see each
//!   other's records

pub mod bounded;
pub mod memory;
pub mod sqlite;

pub use memory::MemoryStateStore;
pub use sqlite::SqliteStore;

use oracle_kernel::types::{Assertion, Dispute, VoteEvent};

use crate::errors::StoreResult;

pub trait StateStore: Send + Sync {
    fn get_assertion(&self, id: &str, instance_id: &str) -> StoreResult<Option<Assertion>>;

    fn put_assertion(&self, assertion: &Assertion, instance_id: &str) -> StoreResult<()>;

    fn get_dispute(&self, id: &str, instance_id: &str) -> StoreResult<Option<Dispute>>;

    fn put_dispute(&self, dispute: &Dispute, instance_id: &str) -> StoreResult<()>;

    fn put_vote_event(&self, vote: &VoteEvent, instance_id: &str) -> StoreResult<()>;

    fn vote_events(&self, assertion_id: &str, instance_id: &str) -> StoreResult<Vec<VoteEvent>>;
}
