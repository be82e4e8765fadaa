// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use oracle_kernel::event::NewOracleEvent;
use oracle_node::events::EventLog;
use serde_json::Value;

use super::{new_table, open_db};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub appended: u64,
    pub stamped: u64,
    pub blank: u64,
}

/// Append every JSON line of `input` to the event log.
///
/// Lines without `instanceId` are assigned `instance`. With `stamp`, lines
/// that carry no checksum get one computed from their payload.
pub fn run(db: Option<PathBuf>, input: &Path, instance: &str, stamp: bool) -> anyhow::Result<IngestSummary> {
    let store = open_db(db)?;
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;

    let mut summary = IngestSummary::default();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            summary.blank += 1;
            continue;
        }
        let mut event = parse_line(&line, instance).with_context(|| format!("line {}", n + 1))?;
        if stamp && event.payload_checksum.is_none() {
            event = event.checksummed();
            summary.stamped += 1;
        }
        store.append(event)?;
        summary.appended += 1;
    }

    tracing::info!("Ingested {} events from {}", summary.appended, input.display());

    let mut table = new_table(vec!["Appended", "Stamped", "Blank lines", "Log size"]);
    table.add_row(vec![
        summary.appended.to_string(),
        summary.stamped.to_string(),
        summary.blank.to_string(),
        store.event_count(instance)?.to_string(),
    ]);
    println!("\nIngest {}\n", input.display());
    println!("{table}\n");
    Ok(summary)
}

fn parse_line(line: &str, instance: &str) -> anyhow::Result<NewOracleEvent> {
    let mut value: Value = serde_json::from_str(line)?;
    let obj = value.as_object_mut().context("expected a JSON object")?;
    obj.entry("instanceId").or_insert_with(|| Value::String(instance.to_string()));
    Ok(serde_json::from_value(value)?)
}
