// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Service facade for surrounding application code.
//!
//! Reads go straight to the store. Writes, live events and replay chunks go
//! through the instance's lane so they are applied in submission order.

use std::sync::Arc;

use oracle_kernel::event::OracleEvent;
use oracle_kernel::types::{Assertion, Dispute};

use crate::config::{BackendKind, NodeConfig};
use crate::errors::{LaneError, StoreResult};
use crate::events::{BlockChunks, EventLog, EventOutcome, MemoryEventLog, ReplayEngine, ReplayReport};
use crate::lanes::InstanceLanes;
use crate::store::memory::MemoryLimits;
use crate::store::{MemoryStateStore, SqliteStore, StateStore};

pub struct OracleService {
    store: Arc<dyn StateStore>,
    log: Arc<dyn EventLog>,
    lanes: InstanceLanes,
    chunk_blocks: u64,
}

impl OracleService {
    pub fn new(log: Arc<dyn EventLog>, store: Arc<dyn StateStore>, cfg: &NodeConfig) -> Self {
        let engine = Arc::new(ReplayEngine::new(log.clone(), store.clone()));
        Self {
            store,
            log,
            lanes: InstanceLanes::new(engine, cfg.lane_queue_depth),
            chunk_blocks: cfg.replay_chunk_blocks.max(1),
        }
    }

    /// Build the configured backend.
    pub fn from_config(cfg: &NodeConfig) -> StoreResult<Self> {
        match cfg.backend {
            BackendKind::Memory => {
                tracing::info!("Using memory backend: {:?}", MemoryLimits::from(cfg));
                let store = Arc::new(MemoryStateStore::new(MemoryLimits::from(cfg)));
                let log = Arc::new(MemoryEventLog::new(cfg.max_log_events));
                Ok(Self::new(log, store, cfg))
            }
            BackendKind::Sqlite => {
                let sqlite = Arc::new(match &cfg.sqlite_path {
                    Some(path) => SqliteStore::open(path)?,
                    None => SqliteStore::in_memory()?,
                });
                Ok(Self::new(sqlite.clone(), sqlite, cfg))
            }
        }
    }

    pub fn event_log(&self) -> &Arc<dyn EventLog> {
        &self.log
    }

    pub fn state_store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Replay `[from_block, to_block]`, one lane command per chunk so live
    /// events for the instance can interleave between chunks.
    ///
    /// A chunk whose fetch fails is logged, counted in `fetch_failures` and
    /// skipped. Only a lane that cannot be reached returns `Err`.
    pub async fn replay_oracle_events_range(
        &self,
        from_block: u64,
        to_block: u64,
        instance_id: &str,
    ) -> Result<ReplayReport, LaneError> {
        let mut total = ReplayReport::default();
        for (lo, hi) in BlockChunks::new(from_block, to_block, self.chunk_blocks) {
            match self.lanes.replay(lo, hi, instance_id).await {
                Ok(report) => total += report,
                Err(LaneError::Replay(e)) => {
                    tracing::error!("{}", e);
                    total.fetch_failures += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    /// Live path: verify and apply one event as the producer discovers it.
    pub async fn ingest_live_event(&self, event: OracleEvent) -> Result<EventOutcome, LaneError> {
        self.lanes.apply(event).await
    }

    pub fn fetch_assertion(&self, id: &str, instance_id: &str) -> StoreResult<Option<Assertion>> {
        self.store.get_assertion(id, instance_id)
    }

    pub fn fetch_dispute(&self, id: &str, instance_id: &str) -> StoreResult<Option<Dispute>> {
        self.store.get_dispute(id, instance_id)
    }

    pub async fn upsert_assertion(&self, assertion: Assertion, instance_id: &str) -> Result<(), LaneError> {
        self.lanes.upsert_assertion(assertion, instance_id).await
    }

    pub async fn upsert_dispute(&self, dispute: Dispute, instance_id: &str) -> Result<(), LaneError> {
        self.lanes.upsert_dispute(dispute, instance_id).await
    }
}
