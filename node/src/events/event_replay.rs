// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Event Replay - Ranged Reconstruction
//!
//! Replays a block range of the oracle event log into the state store.
//!
//! # Protocol
//! 1. Fetch the range, ordered by `(block, log index, id)`
//! 2. For each event: verify checksum, then apply
//! 3. Count what was applied
//!
//! # Invariants
//! - A bad checksum, unknown type, malformed payload or store error costs
//!   exactly that one event; the loop always continues
//! - Replaying a range twice converges: the second pass re-applies the same
//!   events (and reports them as applied) but changes no record
//! - Only a failed fetch returns `Err`, since nothing was scanned

use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Instant;

use oracle_kernel::event::OracleEvent;
use serde::Serialize;

use super::event_apply::EventApplier;
use super::event_log::EventLog;
use crate::errors::ReplayError;
use crate::store::StateStore;

/// What happened to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    Applied,
    /// Payload did not match its checksum. Never applied.
    ChecksumRejected,
    /// Unknown type or malformed payload.
    Skipped,
    /// The store failed while applying.
    Failed,
}

/// Counts for one replay call. `applied <= scanned` always holds, and the
/// four outcome counters sum to `scanned`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub scanned: u64,
    pub applied: u64,
    pub checksum_rejected: u64,
    pub skipped: u64,
    pub failed: u64,
    /// Chunks whose fetch failed. Their events were never scanned.
    pub fetch_failures: u64,
}

impl ReplayReport {
    pub fn record(&mut self, outcome: EventOutcome) {
        self.scanned += 1;
        match outcome {
            EventOutcome::Applied => self.applied += 1,
            EventOutcome::ChecksumRejected => self.checksum_rejected += 1,
            EventOutcome::Skipped => self.skipped += 1,
            EventOutcome::Failed => self.failed += 1,
        }
    }

    /// Events scanned but not applied; the operator's signal to retry.
    pub fn not_applied(&self) -> u64 {
        self.scanned - self.applied
    }
}

impl AddAssign for ReplayReport {
    fn add_assign(&mut self, rhs: Self) {
        self.scanned += rhs.scanned;
        self.applied += rhs.applied;
        self.checksum_rejected += rhs.checksum_rejected;
        self.skipped += rhs.skipped;
        self.failed += rhs.failed;
        self.fetch_failures += rhs.fetch_failures;
    }
}

/// Splits `[from, to]` into inclusive sub-ranges of at most `size` blocks.
#[derive(Debug, Clone)]
pub struct BlockChunks {
    next: Option<u64>,
    to: u64,
    size: u64,
}

impl BlockChunks {
    pub fn new(from: u64, to: u64, size: u64) -> Self {
        Self {
            next: (from <= to).then_some(from),
            to,
            size: size.max(1),
        }
    }
}

impl Iterator for BlockChunks {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next?;
        let end = start.saturating_add(self.size - 1).min(self.to);
        self.next = if end >= self.to { None } else { Some(end + 1) };
        Some((start, end))
    }
}

pub struct ReplayEngine {
    log: Arc<dyn EventLog>,
    applier: EventApplier,
}

impl ReplayEngine {
    pub fn new(log: Arc<dyn EventLog>, store: Arc<dyn StateStore>) -> Self {
        Self {
            log,
            applier: EventApplier::new(store),
        }
    }

    pub fn log(&self) -> &Arc<dyn EventLog> {
        &self.log
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        self.applier.store()
    }

    /// Verify and apply a single event. Shared by replay and live ingestion.
    pub fn process(&self, event: &OracleEvent, instance_id: &str) -> EventOutcome {
        if !event.checksum_ok() {
            tracing::warn!(
                "Checksum mismatch on event {} ({} at block {}:{}); skipping",
                event.id,
                event.event_type,
                event.block_number,
                event.log_index
            );
            metrics::counter!("oracle_replay_checksum_rejected_total", 1);
            return EventOutcome::ChecksumRejected;
        }

        match self.applier.apply(event, instance_id) {
            Ok(true) => EventOutcome::Applied,
            Ok(false) => EventOutcome::Skipped,
            Err(e) => {
                tracing::error!(
                    "Store failure applying event {} ({} at block {}:{}) for {}: {}",
                    event.id,
                    event.event_type,
                    event.block_number,
                    event.log_index,
                    instance_id,
                    e
                );
                EventOutcome::Failed
            }
        }
    }

    /// Replay `[from_block, to_block]` for one instance.
    pub fn replay_range(&self, from_block: u64, to_block: u64, instance_id: &str) -> Result<ReplayReport, ReplayError> {
        let start = Instant::now();
        let events = self
            .log
            .read_range(instance_id, from_block, to_block)
            .map_err(|source| ReplayError::Fetch {
                instance_id: instance_id.to_string(),
                from_block,
                to_block,
                source,
            })?;

        let mut report = ReplayReport::default();
        for event in &events {
            report.record(self.process(event, instance_id));
        }

        metrics::counter!("oracle_replay_events_scanned_total", report.scanned);
        metrics::counter!("oracle_replay_events_applied_total", report.applied);
        metrics::histogram!("oracle_replay_duration_seconds", start.elapsed().as_secs_f64());

        if report.not_applied() > 0 {
            tracing::warn!(
                "Replay {}..={} for {}: applied {}/{} (checksum {}, skipped {}, failed {})",
                from_block,
                to_block,
                instance_id,
                report.applied,
                report.scanned,
                report.checksum_rejected,
                report.skipped,
                report.failed
            );
        } else {
            tracing::info!(
                "Replay {}..={} for {}: applied {}/{}",
                from_block,
                to_block,
                instance_id,
                report.applied,
                report.scanned
            );
        }
        Ok(report)
    }

    /// Replay in sub-ranges of `chunk_blocks`, asking `keep_going` after
    /// each chunk whether to continue.
    ///
    /// A chunk whose fetch fails is logged and counted in
    /// `fetch_failures`; later chunks still run.
    pub fn replay_chunked<F>(
        &self,
        from_block: u64,
        to_block: u64,
        instance_id: &str,
        chunk_blocks: u64,
        mut keep_going: F,
    ) -> ReplayReport
    where
        F: FnMut(&ReplayReport) -> bool,
    {
        let mut total = ReplayReport::default();
        for (lo, hi) in BlockChunks::new(from_block, to_block, chunk_blocks) {
            match self.replay_range(lo, hi, instance_id) {
                Ok(report) => total += report,
                Err(e) => {
                    tracing::error!("{}", e);
                    total.fetch_failures += 1;
                }
            }
            if !keep_going(&total) {
                tracing::info!("Replay for {} stopped after block {}", instance_id, hi);
                break;
            }
        }
        total
    }
}
