// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::sync::OnceLock;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics)
///
/// Safe to call more than once; later calls only warn.
pub fn init_telemetry() {
    // 1. Initialize Tracing (Logs)
    let logs = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "oracle_node=info,oracle_cli=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    if logs.is_err() {
        tracing::warn!("Tracing subscriber already set. Telemetry re-initialized?");
    }

    // 2. Initialize Metrics (Prometheus)
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROM_HANDLE.set(handle).is_err() {
                tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
            }
        }
        Err(e) => tracing::warn!("Metrics recorder not installed: {}", e),
    }

    metrics::describe_counter!("oracle_replay_events_scanned_total", "Events read from the log by replay");
    metrics::describe_counter!("oracle_replay_events_applied_total", "Events applied by replay");
    metrics::describe_counter!("oracle_replay_checksum_rejected_total", "Events skipped for checksum mismatch");
    metrics::describe_counter!("oracle_store_evictions_total", "Entries evicted from the memory store");
    metrics::describe_histogram!("oracle_replay_duration_seconds", "Time taken to replay one block range");

    metrics::gauge!("oracle_node_up", 1.0);
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
