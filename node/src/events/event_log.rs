// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Event Log Reader
//!
//! The log is written by the upstream chain indexer. This core only needs
//! ranged, ordered reads; `append` exists so producers, the CLI and tests
//! can feed a log without a running indexer.
//!
//! # Ordering Contract
//! Every backend returns `read_range` results sorted by
//! `(block_number ASC, log_index ASC, id ASC)`. Backends must agree exactly
//! for the same event set.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use oracle_kernel::event::{NewOracleEvent, OracleEvent};
use rustc_hash::FxHashMap;

use crate::errors::{StoreError, StoreResult};

pub trait EventLog: Send + Sync {
    /// Events for `instance_id` with `from_block <= block_number <= to_block`,
    /// in canonical order. `from_block > to_block` yields nothing.
    fn read_range(&self, instance_id: &str, from_block: u64, to_block: u64) -> StoreResult<Vec<OracleEvent>>;

    /// Append a record, assigning the next monotonic `id`.
    fn append(&self, event: NewOracleEvent) -> StoreResult<OracleEvent>;
}

struct LogInner {
    next_id: u64,
    by_instance: FxHashMap<String, VecDeque<OracleEvent>>,
}

/// Bounded in-process log. When an instance's log is full the oldest
/// inserted record is dropped.
pub struct MemoryEventLog {
    capacity: usize,
    inner: Mutex<LogInner>,
}

impl MemoryEventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(LogInner {
                next_id: 1,
                by_instance: FxHashMap::default(),
            }),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, LogInner>> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    pub fn len(&self, instance_id: &str) -> StoreResult<usize> {
        Ok(self.lock()?.by_instance.get(instance_id).map_or(0, VecDeque::len))
    }
}

impl EventLog for MemoryEventLog {
    fn read_range(&self, instance_id: &str, from_block: u64, to_block: u64) -> StoreResult<Vec<OracleEvent>> {
        if from_block > to_block {
            return Ok(Vec::new());
        }
        let inner = self.lock()?;
        let mut events: Vec<OracleEvent> = inner
            .by_instance
            .get(instance_id)
            .into_iter()
            .flatten()
            .filter(|e| e.block_number >= from_block && e.block_number <= to_block)
            .cloned()
            .collect();
        drop(inner);

        events.sort_by_key(OracleEvent::ordering_key);
        Ok(events)
    }

    fn append(&self, event: NewOracleEvent) -> StoreResult<OracleEvent> {
        let mut inner = self.lock()?;
        let id = inner.next_id;
        inner.next_id += 1;

        let stored = event.into_event(id);
        let capacity = self.capacity;
        let log = inner.by_instance.entry(stored.instance_id.clone()).or_default();
        log.push_back(stored.clone());
        while log.len() > capacity {
            if let Some(dropped) = log.pop_front() {
                tracing::debug!(
                    "Memory log full for {}: dropped event {} (block {})",
                    dropped.instance_id,
                    dropped.id,
                    dropped.block_number
                );
            }
        }
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_kernel::event::EventKind;
    use serde_json::json;

    fn new_event(instance: &str, block: u64, log_index: u32) -> NewOracleEvent {
        NewOracleEvent::new(instance, EventKind::AssertionCreated, json!({"id": format!("{block}-{log_index}")}), block, log_index)
    }

    #[test]
    fn test_read_range_sorted_and_bounded() {
        let log = MemoryEventLog::new(100);
        log.append(new_event("i", 12, 0)).unwrap();
        log.append(new_event("i", 10, 3)).unwrap();
        log.append(new_event("i", 10, 1)).unwrap();
        log.append(new_event("i", 9, 0)).unwrap();
        log.append(new_event("other", 10, 0)).unwrap();

        let keys: Vec<(u64, u32)> = log
            .read_range("i", 10, 12)
            .unwrap()
            .iter()
            .map(|e| (e.block_number, e.log_index))
            .collect();
        assert_eq!(keys, vec![(10, 1), (10, 3), (12, 0)]);
    }

    #[test]
    fn test_id_breaks_ties() {
        let log = MemoryEventLog::new(100);
        let a = log.append(new_event("i", 5, 0)).unwrap();
        let b = log.append(new_event("i", 5, 0)).unwrap();
        assert!(a.id < b.id);

        let ids: Vec<u64> = log.read_range("i", 5, 5).unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let log = MemoryEventLog::new(100);
        log.append(new_event("i", 5, 0)).unwrap();
        assert!(log.read_range("i", 6, 4).unwrap().is_empty());
    }

    #[test]
    fn test_capacity_drops_oldest_inserted() {
        let log = MemoryEventLog::new(2);
        log.append(new_event("i", 1, 0)).unwrap();
        log.append(new_event("i", 2, 0)).unwrap();
        log.append(new_event("i", 3, 0)).unwrap();
        assert_eq!(log.len("i").unwrap(), 2);
        let blocks: Vec<u64> = log.read_range("i", 0, 10).unwrap().iter().map(|e| e.block_number).collect();
        assert_eq!(blocks, vec![2, 3]);
    }
}
