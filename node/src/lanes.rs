// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Per-instance writer lanes.
//!
//! Every mutation for an instance goes through that instance's lane: one
//! tokio task draining a bounded queue in arrival order. Live events and
//! replay chunks for the same instance therefore never interleave inside a
//! single apply, while different instances proceed in parallel.
//!
//! Store calls are synchronous. Each one runs on tokio's blocking pool while
//! the lane task awaits it, so a slow store stalls only its own lane.

use std::sync::{Arc, Mutex};

use oracle_kernel::event::OracleEvent;
use oracle_kernel::types::{Assertion, Dispute};
use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, oneshot};

use crate::errors::LaneError;
use crate::events::{EventOutcome, ReplayEngine, ReplayReport};

type Reply<T> = oneshot::Sender<Result<T, LaneError>>;

enum LaneCommand {
    Apply { event: OracleEvent, reply: Reply<EventOutcome> },
    Replay { from_block: u64, to_block: u64, reply: Reply<ReplayReport> },
    UpsertAssertion { assertion: Assertion, reply: Reply<()> },
    UpsertDispute { dispute: Dispute, reply: Reply<()> },
}

/// Runs one command to completion on the calling thread.
fn execute(engine: &ReplayEngine, instance_id: &str, cmd: LaneCommand) {
    // A dropped reply receiver just means the caller stopped waiting.
    match cmd {
        LaneCommand::Apply { event, reply } => {
            let _ = reply.send(Ok(engine.process(&event, instance_id)));
        }
        LaneCommand::Replay { from_block, to_block, reply } => {
            let result = engine
                .replay_range(from_block, to_block, instance_id)
                .map_err(LaneError::from);
            let _ = reply.send(result);
        }
        LaneCommand::UpsertAssertion { assertion, reply } => {
            let result = engine.store().put_assertion(&assertion, instance_id).map_err(LaneError::from);
            let _ = reply.send(result);
        }
        LaneCommand::UpsertDispute { dispute, reply } => {
            let result = engine.store().put_dispute(&dispute, instance_id).map_err(LaneError::from);
            let _ = reply.send(result);
        }
    }
}

async fn run_lane(instance_id: String, engine: Arc<ReplayEngine>, mut rx: mpsc::Receiver<LaneCommand>) {
    tracing::debug!("Lane for {} started", instance_id);
    while let Some(cmd) = rx.recv().await {
        // Store calls block; keep them off the async workers. Awaiting each
        // one before the next recv keeps the lane in submission order.
        let engine = engine.clone();
        let id = instance_id.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || execute(&engine, &id, cmd)).await {
            tracing::error!("Lane command for {} aborted: {}", instance_id, e);
        }
    }
    tracing::debug!("Lane for {} stopped", instance_id);
}

pub struct InstanceLanes {
    engine: Arc<ReplayEngine>,
    queue_depth: usize,
    lanes: Mutex<FxHashMap<String, mpsc::Sender<LaneCommand>>>,
}

impl InstanceLanes {
    pub fn new(engine: Arc<ReplayEngine>, queue_depth: usize) -> Self {
        Self {
            engine,
            queue_depth: queue_depth.max(1),
            lanes: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn engine(&self) -> &Arc<ReplayEngine> {
        &self.engine
    }

    /// Number of lanes spawned so far.
    pub fn active(&self) -> usize {
        self.lanes.lock().map(|l| l.len()).unwrap_or(0)
    }

    fn sender(&self, instance_id: &str) -> Result<mpsc::Sender<LaneCommand>, LaneError> {
        let mut lanes = self
            .lanes
            .lock()
            .map_err(|_| LaneError::Closed(instance_id.to_string()))?;

        if let Some(tx) = lanes.get(instance_id) {
            if !tx.is_closed() {
                return Ok(tx.clone());
            }
            tracing::warn!("Lane for {} had stopped; respawning", instance_id);
        }

        let (tx, rx) = mpsc::channel(self.queue_depth);
        tokio::spawn(run_lane(instance_id.to_string(), self.engine.clone(), rx));
        lanes.insert(instance_id.to_string(), tx.clone());
        Ok(tx)
    }

    async fn submit<T>(
        &self,
        instance_id: &str,
        make: impl FnOnce(Reply<T>) -> LaneCommand,
    ) -> Result<T, LaneError> {
        let tx = self.sender(instance_id)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(make(reply_tx))
            .await
            .map_err(|_| LaneError::Closed(instance_id.to_string()))?;
        reply_rx
            .await
            .map_err(|_| LaneError::NoReply(instance_id.to_string()))?
    }

    pub async fn apply(&self, event: OracleEvent) -> Result<EventOutcome, LaneError> {
        let instance_id = event.instance_id.clone();
        self.submit(&instance_id, |reply| LaneCommand::Apply { event, reply }).await
    }

    pub async fn replay(&self, from_block: u64, to_block: u64, instance_id: &str) -> Result<ReplayReport, LaneError> {
        self.submit(instance_id, |reply| LaneCommand::Replay { from_block, to_block, reply })
            .await
    }

    pub async fn upsert_assertion(&self, assertion: Assertion, instance_id: &str) -> Result<(), LaneError> {
        self.submit(instance_id, |reply| LaneCommand::UpsertAssertion { assertion, reply })
            .await
    }

    pub async fn upsert_dispute(&self, dispute: Dispute, instance_id: &str) -> Result<(), LaneError> {
        self.submit(instance_id, |reply| LaneCommand::UpsertDispute { dispute, reply })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventLog, MemoryEventLog};
    use crate::store::{MemoryStateStore, StateStore};
    use oracle_kernel::event::{EventKind, NewOracleEvent};
    use serde_json::json;

    fn lanes() -> (InstanceLanes, Arc<MemoryEventLog>, Arc<MemoryStateStore>) {
        let log = Arc::new(MemoryEventLog::new(1000));
        let store = Arc::new(MemoryStateStore::default());
        let engine = Arc::new(ReplayEngine::new(log.clone(), store.clone()));
        (InstanceLanes::new(engine, 8), log, store)
    }

    #[tokio::test]
    async fn test_lane_per_instance() {
        let (lanes, log, store) = lanes();
        for instance in ["a", "b"] {
            let e = log
                .append(NewOracleEvent::new(instance, EventKind::AssertionCreated, json!({"id": "X"}), 1, 0))
                .unwrap();
            assert_eq!(lanes.apply(e).await.unwrap(), EventOutcome::Applied);
        }
        assert_eq!(lanes.active(), 2);
        assert!(store.get_assertion("X", "a").unwrap().is_some());
        assert!(store.get_assertion("X", "b").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upserts_go_through_lane() {
        let (lanes, _log, store) = lanes();
        lanes.upsert_assertion(Assertion::pending("Y", "polygon"), "a").await.unwrap();
        lanes.upsert_dispute(Dispute::open("Y", "polygon"), "a").await.unwrap();
        assert!(store.get_assertion("Y", "a").unwrap().is_some());
        assert!(store.get_dispute("D:Y", "a").unwrap().is_some());
        assert_eq!(lanes.active(), 1);
    }

    #[tokio::test]
    async fn test_replay_through_lane() {
        let (lanes, log, _store) = lanes();
        log.append(NewOracleEvent::new("a", EventKind::AssertionCreated, json!({"id": "X"}), 5, 0))
            .unwrap();
        let report = lanes.replay(0, 10, "a").await.unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(report.scanned, 1);
    }
}
