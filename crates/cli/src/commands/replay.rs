// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::PathBuf;
use std::sync::Arc;

use oracle_node::config::NodeConfig;
use oracle_node::events::{ReplayEngine, ReplayReport};
use oracle_node::telemetry;

use super::{new_table, open_db};

pub fn run(
    db: Option<PathBuf>,
    instance: &str,
    from_block: u64,
    to_block: u64,
    chunk_blocks: Option<u64>,
    show_metrics: bool,
) -> anyhow::Result<ReplayReport> {
    let store = Arc::new(open_db(db)?);
    let chunk = chunk_blocks.unwrap_or_else(|| NodeConfig::from_env().replay_chunk_blocks);
    let engine = ReplayEngine::new(store.clone(), store);

    let report = engine.replay_chunked(from_block, to_block, instance, chunk, |_| true);

    let mut table = new_table(vec!["Scanned", "Applied", "Checksum rejected", "Skipped", "Failed", "Fetch failures"]);
    table.add_row(vec![
        report.scanned.to_string(),
        report.applied.to_string(),
        report.checksum_rejected.to_string(),
        report.skipped.to_string(),
        report.failed.to_string(),
        report.fetch_failures.to_string(),
    ]);
    println!("\nReplay {instance} blocks {from_block}..={to_block}\n");
    println!("{table}\n");

    if report.not_applied() > 0 {
        println!("⚠️  {} events not applied. Re-run the range after fixing them.\n", report.not_applied());
    }
    if show_metrics {
        println!("{}", telemetry::get_metrics());
    }
    Ok(report)
}
