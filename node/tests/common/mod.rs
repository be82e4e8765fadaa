// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![allow(dead_code)]

use std::sync::Arc;

use oracle_kernel::event::{EventKind, NewOracleEvent, OracleEvent};
use oracle_node::errors::{StoreError, StoreResult};
use oracle_node::events::{EventLog, MemoryEventLog};
use oracle_node::store::{MemoryStateStore, SqliteStore, StateStore};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const INSTANCE: &str = "default";

/// One backend under test. The temp dir keeps a file-backed database alive.
pub struct Backend {
    pub name: &'static str,
    pub log: Arc<dyn EventLog>,
    pub store: Arc<dyn StateStore>,
    _dir: Option<TempDir>,
}

pub fn memory_backend() -> Backend {
    Backend {
        name: "memory",
        log: Arc::new(MemoryEventLog::new(10_000)),
        store: Arc::new(MemoryStateStore::default()),
        _dir: None,
    }
}

pub fn sqlite_backend() -> Backend {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = Arc::new(SqliteStore::open(dir.path().join("oracle.db")).unwrap());
    Backend {
        name: "sqlite",
        log: sqlite.clone(),
        store: sqlite,
        _dir: Some(dir),
    }
}

pub fn backends() -> Vec<Backend> {
    vec![memory_backend(), sqlite_backend()]
}

pub fn created(id: &str, block: u64, log_index: u32) -> NewOracleEvent {
    NewOracleEvent::new(
        INSTANCE,
        EventKind::AssertionCreated,
        json!({"id": id, "chain": "polygon", "asserter": "0xasserter", "bond": "500"}),
        block,
        log_index,
    )
    .with_assertion_id(id)
    .checksummed()
}

pub fn disputed(id: &str, disputer: &str, block: u64, log_index: u32) -> NewOracleEvent {
    NewOracleEvent::new(
        INSTANCE,
        EventKind::AssertionDisputed,
        json!({"assertionId": id, "disputer": disputer, "disputedAt": "2025-02-01T00:00:00Z"}),
        block,
        log_index,
    )
    .with_assertion_id(id)
    .checksummed()
}

pub fn vote(id: &str, voter: &str, support: bool, weight: u64, block: u64, log_index: u32) -> NewOracleEvent {
    NewOracleEvent::new(
        INSTANCE,
        EventKind::VoteCast,
        json!({
            "assertionId": id,
            "voter": voter,
            "support": support,
            "weight": weight,
            "txHash": format!("0xtx{block}-{log_index}"),
        }),
        block,
        log_index,
    )
    .with_assertion_id(id)
    .checksummed()
}

pub fn resolved(id: &str, outcome: bool, block: u64, log_index: u32) -> NewOracleEvent {
    NewOracleEvent::new(
        INSTANCE,
        EventKind::AssertionResolved,
        json!({"assertionId": id, "settlementResolution": outcome, "resolvedAt": "2025-02-03T00:00:00Z"}),
        block,
        log_index,
    )
    .with_assertion_id(id)
    .checksummed()
}

pub fn raw(event_type: &str, payload: Value, block: u64, log_index: u32) -> NewOracleEvent {
    NewOracleEvent {
        instance_id: INSTANCE.to_string(),
        event_type: event_type.to_string(),
        assertion_id: None,
        payload,
        payload_checksum: None,
        block_number: block,
        log_index,
    }
}

/// Memory log whose reads fail for any range starting at or after `fail_from`.
pub struct FailingLog {
    pub inner: MemoryEventLog,
    pub fail_from: u64,
}

impl FailingLog {
    pub fn new(fail_from: u64) -> Self {
        Self {
            inner: MemoryEventLog::new(10_000),
            fail_from,
        }
    }
}

impl EventLog for FailingLog {
    fn read_range(&self, instance_id: &str, from_block: u64, to_block: u64) -> StoreResult<Vec<OracleEvent>> {
        if from_block >= self.fail_from {
            return Err(StoreError::LockPoisoned);
        }
        self.inner.read_range(instance_id, from_block, to_block)
    }

    fn append(&self, event: NewOracleEvent) -> StoreResult<OracleEvent> {
        self.inner.append(event)
    }
}
