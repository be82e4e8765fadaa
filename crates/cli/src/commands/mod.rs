// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod assertion;
pub mod dispute;
pub mod ingest;
pub mod replay;
pub mod votes;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use oracle_node::config::NodeConfig;
use oracle_node::store::SqliteStore;

/// Open the database named on the command line, falling back to
/// `ORACLE_SQLITE_PATH`.
pub fn open_db(db: Option<PathBuf>) -> anyhow::Result<SqliteStore> {
    let path = db
        .or_else(|| NodeConfig::from_env().sqlite_path)
        .context("no database given: pass --db or set ORACLE_SQLITE_PATH")?;
    SqliteStore::open(&path).with_context(|| format!("opening {}", path.display()))
}

pub(crate) fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub(crate) fn ts(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "-".to_string())
}

pub(crate) fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
