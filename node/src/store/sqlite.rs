// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! `SQLite`-backed event log and state store.
//!
//! One connection serves both the `oracle_events` log and the derived
//! tables, so a CLI or test can point a single file at the whole engine.
//! WAL journal mode lets readers proceed while a lane is writing.
//!
//! Amounts are `u128` and stored as decimal TEXT. Block numbers are stored
//! as INTEGER through [`block_key`], which maps the full `u64` range onto
//! `i64` without changing order.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use oracle_kernel::error::KernelError;
use oracle_kernel::event::{NewOracleEvent, OracleEvent};
use oracle_kernel::types::amount::parse_amount;
use oracle_kernel::types::{Assertion, Dispute, VoteEvent};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};

use super::StateStore;
use crate::errors::{StoreError, StoreResult};
use crate::events::EventLog;

/// Schema SQL embedded at compile time.
const SCHEMA_SQL: &str = include_str!("schema.sql");

const EVENT_COLUMNS: &str =
    "id, instance_id, event_type, assertion_id, payload, payload_checksum, block_number, log_index";

const ASSERTION_COLUMNS: &str = "id, chain, status, asserter, claim, market, bond, currency, identifier, \
     asserted_at, liveness_ends_at, tx_hash, disputer, disputed_at, resolved_at, settlement_resolution";

const DISPUTE_COLUMNS: &str = "id, assertion_id, chain, disputer, status, current_votes_for, \
     current_votes_against, total_votes, disputed_at, voting_ends_at";

const VOTE_COLUMNS: &str = "chain, assertion_id, voter, support, weight, tx_hash, block_number, log_index";

/// Order-preserving `u64 -> i64`: flips the sign bit so block 0 lands on
/// `i64::MIN` and `u64::MAX` on `i64::MAX`.
fn block_key(block: u64) -> i64 {
    (block ^ (1 << 63)) as i64
}

fn block_from_key(key: i64) -> u64 {
    (key as u64) ^ (1 << 63)
}

fn conversion_error(idx: usize, err: KernelError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn amount_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<u128> {
    let text: String = row.get(idx)?;
    parse_amount(&text).map_err(|e| conversion_error(idx, e))
}

fn optional_amount_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<u128>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| parse_amount(&t).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn status_column<T: FromStr<Err = KernelError>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| conversion_error(idx, e))
}

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<std::path::PathBuf>,
}

impl SqliteStore {
    /// Opens or creates a database at `path` and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        tracing::info!("Opened SQLite store at {:?}", path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Private in-memory database, mainly for tests.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Assertions for an instance, ordered by id. Used by operator tooling.
    pub fn list_assertions(&self, instance_id: &str, limit: u64) -> StoreResult<Vec<Assertion>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ASSERTION_COLUMNS} FROM assertions WHERE instance_id = ?1 ORDER BY id ASC LIMIT ?2"
        ))?;
        let rows = stmt
            .query_map(params![instance_id, limit as i64], Self::row_to_assertion)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of log records stored for an instance.
    pub fn event_count(&self, instance_id: &str) -> StoreResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM oracle_events WHERE instance_id = ?1",
            params![instance_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn row_to_event(row: &Row<'_>) -> rusqlite::Result<OracleEvent> {
        Ok(OracleEvent {
            id: row.get::<_, i64>(0)? as u64,
            instance_id: row.get(1)?,
            event_type: row.get(2)?,
            assertion_id: row.get(3)?,
            payload: row.get(4)?,
            payload_checksum: row.get(5)?,
            block_number: block_from_key(row.get(6)?),
            log_index: row.get::<_, i64>(7)? as u32,
        })
    }

    fn row_to_assertion(row: &Row<'_>) -> rusqlite::Result<Assertion> {
        Ok(Assertion {
            id: row.get(0)?,
            chain: row.get(1)?,
            status: status_column(row, 2)?,
            asserter: row.get(3)?,
            claim: row.get(4)?,
            market: row.get(5)?,
            bond: optional_amount_column(row, 6)?,
            currency: row.get(7)?,
            identifier: row.get(8)?,
            asserted_at: row.get(9)?,
            liveness_ends_at: row.get(10)?,
            tx_hash: row.get(11)?,
            disputer: row.get(12)?,
            disputed_at: row.get(13)?,
            resolved_at: row.get(14)?,
            settlement_resolution: row.get(15)?,
        })
    }

    fn row_to_dispute(row: &Row<'_>) -> rusqlite::Result<Dispute> {
        Ok(Dispute {
            id: row.get(0)?,
            assertion_id: row.get(1)?,
            chain: row.get(2)?,
            disputer: row.get(3)?,
            status: status_column(row, 4)?,
            current_votes_for: amount_column(row, 5)?,
            current_votes_against: amount_column(row, 6)?,
            total_votes: amount_column(row, 7)?,
            disputed_at: row.get(8)?,
            voting_ends_at: row.get(9)?,
        })
    }

    fn row_to_vote(row: &Row<'_>) -> rusqlite::Result<VoteEvent> {
        Ok(VoteEvent {
            chain: row.get(0)?,
            assertion_id: row.get(1)?,
            voter: row.get(2)?,
            support: row.get(3)?,
            weight: amount_column(row, 4)?,
            tx_hash: row.get(5)?,
            block_number: block_from_key(row.get(6)?),
            log_index: row.get::<_, i64>(7)? as u32,
        })
    }
}

impl EventLog for SqliteStore {
    fn read_range(&self, instance_id: &str, from_block: u64, to_block: u64) -> StoreResult<Vec<OracleEvent>> {
        if from_block > to_block {
            return Ok(Vec::new());
        }
        let (from, to) = (block_key(from_block), block_key(to_block));

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS}
             FROM oracle_events
             WHERE instance_id = ?1 AND block_number >= ?2 AND block_number <= ?3
             ORDER BY block_number ASC, log_index ASC, id ASC"
        ))?;
        let events = stmt
            .query_map(params![instance_id, from, to], Self::row_to_event)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    fn append(&self, event: NewOracleEvent) -> StoreResult<OracleEvent> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO oracle_events (instance_id, event_type, assertion_id, payload, payload_checksum, block_number, log_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.instance_id,
                event.event_type,
                event.assertion_id,
                event.payload,
                event.payload_checksum,
                block_key(event.block_number),
                event.log_index as i64,
            ],
        )?;
        let id = conn.last_insert_rowid() as u64;
        Ok(event.into_event(id))
    }
}

impl StateStore for SqliteStore {
    fn get_assertion(&self, id: &str, instance_id: &str) -> StoreResult<Option<Assertion>> {
        let conn = self.lock()?;
        let assertion = conn
            .query_row(
                &format!("SELECT {ASSERTION_COLUMNS} FROM assertions WHERE instance_id = ?1 AND id = ?2"),
                params![instance_id, id],
                Self::row_to_assertion,
            )
            .optional()?;
        Ok(assertion)
    }

    fn put_assertion(&self, a: &Assertion, instance_id: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO assertions (instance_id, id, chain, status, asserter, claim, market, bond, currency, identifier,
                                     asserted_at, liveness_ends_at, tx_hash, disputer, disputed_at, resolved_at, settlement_resolution)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
             ON CONFLICT (instance_id, id) DO UPDATE SET
                chain = excluded.chain,
                status = excluded.status,
                asserter = excluded.asserter,
                claim = excluded.claim,
                market = excluded.market,
                bond = excluded.bond,
                currency = excluded.currency,
                identifier = excluded.identifier,
                asserted_at = excluded.asserted_at,
                liveness_ends_at = excluded.liveness_ends_at,
                tx_hash = excluded.tx_hash,
                disputer = excluded.disputer,
                disputed_at = excluded.disputed_at,
                resolved_at = excluded.resolved_at,
                settlement_resolution = excluded.settlement_resolution",
            params![
                instance_id,
                a.id,
                a.chain,
                a.status.as_str(),
                a.asserter,
                a.claim,
                a.market,
                a.bond.map(|b| b.to_string()),
                a.currency,
                a.identifier,
                a.asserted_at,
                a.liveness_ends_at,
                a.tx_hash,
                a.disputer,
                a.disputed_at,
                a.resolved_at,
                a.settlement_resolution,
            ],
        )?;
        Ok(())
    }

    fn get_dispute(&self, id: &str, instance_id: &str) -> StoreResult<Option<Dispute>> {
        let conn = self.lock()?;
        let dispute = conn
            .query_row(
                &format!("SELECT {DISPUTE_COLUMNS} FROM disputes WHERE instance_id = ?1 AND id = ?2"),
                params![instance_id, id],
                Self::row_to_dispute,
            )
            .optional()?;
        Ok(dispute)
    }

    fn put_dispute(&self, d: &Dispute, instance_id: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO disputes (instance_id, id, assertion_id, chain, disputer, status, current_votes_for,
                                   current_votes_against, total_votes, disputed_at, voting_ends_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT (instance_id, id) DO UPDATE SET
                assertion_id = excluded.assertion_id,
                chain = excluded.chain,
                disputer = excluded.disputer,
                status = excluded.status,
                current_votes_for = excluded.current_votes_for,
                current_votes_against = excluded.current_votes_against,
                total_votes = excluded.total_votes,
                disputed_at = excluded.disputed_at,
                voting_ends_at = excluded.voting_ends_at",
            params![
                instance_id,
                d.id,
                d.assertion_id,
                d.chain,
                d.disputer,
                d.status.as_str(),
                d.current_votes_for.to_string(),
                d.current_votes_against.to_string(),
                d.total_votes.to_string(),
                d.disputed_at,
                d.voting_ends_at,
            ],
        )?;
        Ok(())
    }

    fn put_vote_event(&self, v: &VoteEvent, instance_id: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO vote_events (instance_id, assertion_id, chain, voter, support, weight, tx_hash, block_number, log_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                instance_id,
                v.assertion_id,
                v.chain,
                v.voter,
                v.support,
                v.weight.to_string(),
                v.tx_hash,
                block_key(v.block_number),
                v.log_index as i64,
            ],
        )?;
        if inserted == 0 {
            tracing::trace!(
                "Vote {}:{} for {} already stored",
                v.block_number,
                v.log_index,
                v.assertion_id
            );
        }
        Ok(())
    }

    fn vote_events(&self, assertion_id: &str, instance_id: &str) -> StoreResult<Vec<VoteEvent>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {VOTE_COLUMNS} FROM vote_events
             WHERE instance_id = ?1 AND assertion_id = ?2
             ORDER BY block_number ASC, log_index ASC"
        ))?;
        let votes = stmt
            .query_map(params![instance_id, assertion_id], Self::row_to_vote)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(votes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_kernel::event::EventKind;
    use oracle_kernel::types::{AssertionStatus, DisputeStatus};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_schema_applies_twice() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("oracle.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.put_assertion(&Assertion::pending("X", "polygon"), "i").unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let a = store.get_assertion("X", "i").unwrap().unwrap();
        assert_eq!(a.status, AssertionStatus::Pending);
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_large_amounts_survive() {
        let store = SqliteStore::in_memory().unwrap();
        let mut d = Dispute::open("X", "polygon");
        d.current_votes_for = u128::MAX;
        d.total_votes = u128::MAX;
        d.status = DisputeStatus::PendingExecution;
        store.put_dispute(&d, "i").unwrap();
        assert_eq!(store.get_dispute("D:X", "i").unwrap(), Some(d));
    }

    #[test]
    fn test_block_key_preserves_order_over_full_range() {
        let blocks = [0, 1, 5, (1 << 63) - 1, 1 << 63, (1 << 63) + 1, u64::MAX];
        for pair in blocks.windows(2) {
            assert!(block_key(pair[0]) < block_key(pair[1]), "{:?}", pair);
        }
        for b in blocks {
            assert_eq!(block_from_key(block_key(b)), b);
        }
    }

    #[test]
    fn test_votes_above_i64_range_keep_their_block() {
        let store = SqliteStore::in_memory().unwrap();
        let vote = VoteEvent {
            chain: "polygon".into(),
            assertion_id: "X".into(),
            voter: "0xv".into(),
            support: true,
            weight: 1,
            tx_hash: "0xt".into(),
            block_number: u64::MAX,
            log_index: 0,
        };
        store.put_vote_event(&vote, "i").unwrap();
        assert_eq!(store.vote_events("X", "i").unwrap(), vec![vote]);
    }

    #[test]
    fn test_payload_and_checksum_roundtrip_through_text() {
        let store = SqliteStore::in_memory().unwrap();
        let stored = store
            .append(
                NewOracleEvent::new("i", EventKind::VoteCast, json!({"assertionId": "X", "support": true, "weight": "5"}), 3, 1)
                    .checksummed(),
            )
            .unwrap();
        let read = store.read_range("i", 3, 3).unwrap();
        assert_eq!(read, vec![stored]);
        assert!(read[0].checksum_ok());
        assert_eq!(store.event_count("i").unwrap(), 1);
    }

    #[test]
    fn test_corrupt_status_is_error_not_panic() {
        let store = SqliteStore::in_memory().unwrap();
        store.put_assertion(&Assertion::pending("X", "polygon"), "i").unwrap();
        store
            .lock()
            .unwrap()
            .execute("UPDATE assertions SET status = 'exploded'", [])
            .unwrap();
        assert!(matches!(store.get_assertion("X", "i"), Err(StoreError::Database(_))));
    }

    #[test]
    fn test_unbounded_upper_block() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .append(NewOracleEvent::new("i", EventKind::AssertionCreated, json!({"id": "X"}), 42, 0))
            .unwrap();
        assert_eq!(store.read_range("i", 0, u64::MAX).unwrap().len(), 1);
    }
}
