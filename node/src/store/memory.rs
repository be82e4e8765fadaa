// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-memory State Store.
//!
//! Each instance id owns an [`InstanceArena`] of three bounded maps. The
//! bounds keep long-running dev processes from growing without limit; they
//! are not a correctness mechanism. An assertion evicted while later events
//! still refer to it is simply "not found" for those events. Use
//! [`SqliteStore`](super::SqliteStore) where that matters.

use std::sync::{Mutex, MutexGuard};

use oracle_kernel::types::{Assertion, Dispute, VoteEvent};
use rustc_hash::FxHashMap;

use super::bounded::BoundedMap;
use super::StateStore;
use crate::config::NodeConfig;
use crate::errors::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLimits {
    pub max_assertions: usize,
    pub max_disputes: usize,
    /// Number of assertions whose vote lists are kept.
    pub max_vote_assertions: usize,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self::from(&NodeConfig::default())
    }
}

impl From<&NodeConfig> for MemoryLimits {
    fn from(cfg: &NodeConfig) -> Self {
        Self {
            max_assertions: cfg.max_assertions,
            max_disputes: cfg.max_disputes,
            max_vote_assertions: cfg.max_vote_assertions,
        }
    }
}

/// Bounded collections for one instance.
#[derive(Debug)]
pub struct InstanceArena {
    assertions: BoundedMap<String, Assertion>,
    disputes: BoundedMap<String, Dispute>,
    votes: BoundedMap<String, Vec<VoteEvent>>,
}

impl InstanceArena {
    pub fn new(limits: MemoryLimits) -> Self {
        Self {
            assertions: BoundedMap::new(limits.max_assertions),
            disputes: BoundedMap::new(limits.max_disputes),
            votes: BoundedMap::new(limits.max_vote_assertions),
        }
    }
}

fn log_evicted<V>(instance_id: &str, kind: &'static str, evicted: &[(String, V)]) {
    for (key, _) in evicted {
        tracing::debug!("Evicted {} {} from instance {}", kind, key, instance_id);
    }
    if !evicted.is_empty() {
        metrics::counter!("oracle_store_evictions_total", evicted.len() as u64, "kind" => kind);
    }
}

pub struct MemoryStateStore {
    limits: MemoryLimits,
    arenas: Mutex<FxHashMap<String, InstanceArena>>,
}

impl MemoryStateStore {
    pub fn new(limits: MemoryLimits) -> Self {
        Self {
            limits,
            arenas: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn limits(&self) -> MemoryLimits {
        self.limits
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, FxHashMap<String, InstanceArena>>> {
        self.arenas.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Run `f` against the arena for `instance_id`, creating it on first use.
    fn with_arena<T>(&self, instance_id: &str, f: impl FnOnce(&mut InstanceArena) -> T) -> StoreResult<T> {
        let mut arenas = self.lock()?;
        if !arenas.contains_key(instance_id) {
            tracing::debug!("Creating memory arena for instance {}", instance_id);
            arenas.insert(instance_id.to_string(), InstanceArena::new(self.limits));
        }
        let arena = arenas.get_mut(instance_id).ok_or(StoreError::LockPoisoned)?;
        Ok(f(arena))
    }

    /// Read-only access; `None` when the instance has never been written.
    fn read_arena<T>(&self, instance_id: &str, f: impl FnOnce(&InstanceArena) -> T) -> StoreResult<Option<T>> {
        let arenas = self.lock()?;
        Ok(arenas.get(instance_id).map(f))
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new(MemoryLimits::default())
    }
}

impl StateStore for MemoryStateStore {
    fn get_assertion(&self, id: &str, instance_id: &str) -> StoreResult<Option<Assertion>> {
        let key = id.to_string();
        Ok(self
            .read_arena(instance_id, |a| a.assertions.get(&key).cloned())?
            .flatten())
    }

    fn put_assertion(&self, assertion: &Assertion, instance_id: &str) -> StoreResult<()> {
        let evicted = self.with_arena(instance_id, |a| {
            a.assertions.insert(assertion.id.clone(), assertion.clone())
        })?;
        log_evicted(instance_id, "assertion", &evicted);
        Ok(())
    }

    fn get_dispute(&self, id: &str, instance_id: &str) -> StoreResult<Option<Dispute>> {
        let key = id.to_string();
        Ok(self
            .read_arena(instance_id, |a| a.disputes.get(&key).cloned())?
            .flatten())
    }

    fn put_dispute(&self, dispute: &Dispute, instance_id: &str) -> StoreResult<()> {
        let evicted = self.with_arena(instance_id, |a| {
            a.disputes.insert(dispute.id.clone(), dispute.clone())
        })?;
        log_evicted(instance_id, "dispute", &evicted);
        Ok(())
    }

    fn put_vote_event(&self, vote: &VoteEvent, instance_id: &str) -> StoreResult<()> {
        let evicted = self.with_arena(instance_id, |a| {
            a.votes.update(vote.assertion_id.clone(), |votes| {
                if votes.iter().any(|v| v.identity() == vote.identity()) {
                    return;
                }
                let pos = votes
                    .partition_point(|v| (v.block_number, v.log_index) <= (vote.block_number, vote.log_index));
                votes.insert(pos, vote.clone());
            })
        })?;
        log_evicted(instance_id, "vote list", &evicted);
        Ok(())
    }

    fn vote_events(&self, assertion_id: &str, instance_id: &str) -> StoreResult<Vec<VoteEvent>> {
        let key = assertion_id.to_string();
        Ok(self
            .read_arena(instance_id, |a| a.votes.get(&key).cloned())?
            .flatten()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> MemoryStateStore {
        MemoryStateStore::new(MemoryLimits {
            max_assertions: 2,
            max_disputes: 2,
            max_vote_assertions: 1,
        })
    }

    fn vote(assertion: &str, log_index: u32) -> VoteEvent {
        VoteEvent {
            chain: "polygon".into(),
            assertion_id: assertion.into(),
            voter: "0xv".into(),
            support: true,
            weight: 1,
            tx_hash: format!("0xt{log_index}"),
            block_number: 1,
            log_index,
        }
    }

    #[test]
    fn test_assertions_evicted_least_recently_updated() {
        let store = small();
        store.put_assertion(&Assertion::pending("A", "c"), "i").unwrap();
        store.put_assertion(&Assertion::pending("B", "c"), "i").unwrap();
        store.put_assertion(&Assertion::pending("A", "c"), "i").unwrap();
        store.put_assertion(&Assertion::pending("C", "c"), "i").unwrap();

        assert!(store.get_assertion("A", "i").unwrap().is_some());
        assert!(store.get_assertion("B", "i").unwrap().is_none());
        assert!(store.get_assertion("C", "i").unwrap().is_some());
    }

    #[test]
    fn test_instances_are_isolated_arenas() {
        let store = small();
        store.put_assertion(&Assertion::pending("A", "c"), "one").unwrap();
        store.put_assertion(&Assertion::pending("B", "c"), "two").unwrap();
        store.put_assertion(&Assertion::pending("C", "c"), "two").unwrap();

        // "two" filling up must not evict from "one"
        assert!(store.get_assertion("A", "one").unwrap().is_some());
        assert!(store.get_assertion("A", "two").unwrap().is_none());
    }

    #[test]
    fn test_vote_lists_evicted_per_assertion() {
        let store = small();
        store.put_vote_event(&vote("A", 0), "i").unwrap();
        store.put_vote_event(&vote("B", 0), "i").unwrap();
        assert!(store.vote_events("A", "i").unwrap().is_empty());
        assert_eq!(store.vote_events("B", "i").unwrap().len(), 1);
    }

    #[test]
    fn test_votes_kept_in_log_order() {
        let store = MemoryStateStore::default();
        store.put_vote_event(&vote("A", 5), "i").unwrap();
        store.put_vote_event(&vote("A", 1), "i").unwrap();
        store.put_vote_event(&vote("A", 3), "i").unwrap();
        let idx: Vec<u32> = store.vote_events("A", "i").unwrap().iter().map(|v| v.log_index).collect();
        assert_eq!(idx, vec![1, 3, 5]);
    }
}
