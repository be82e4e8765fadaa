// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Bounded in-process maps. State is lost on restart.
    Memory,
    /// SQLite file (or `:memory:`). No eviction.
    Sqlite,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(format!("unknown backend {:?} (expected memory|sqlite)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub backend: BackendKind,
    /// SQLite database path; `None` opens an in-memory database.
    pub sqlite_path: Option<PathBuf>,

    // Memory backend bounds, per instance
    pub max_assertions: usize,
    pub max_disputes: usize,
    pub max_vote_assertions: usize,
    pub max_log_events: usize,

    /// Blocks per replay sub-range submitted to a lane.
    pub replay_chunk_blocks: u64,
    /// Pending commands per instance lane before senders wait.
    pub lane_queue_depth: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            sqlite_path: None,
            max_assertions: 10_000,
            max_disputes: 10_000,
            max_vote_assertions: 10_000,
            max_log_events: 100_000,
            replay_chunk_blocks: 1_000,
            lane_queue_depth: 256,
        }
    }
}

fn env_parse<T: FromStr>(key: &str, into: &mut T) {
    if let Ok(raw) = std::env::var(key) {
        match raw.parse() {
            Ok(v) => *into = v,
            Err(_) => tracing::warn!("Ignoring {}={:?}: not a valid value", key, raw),
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by `ORACLE_*` environment variables.
    ///
    /// Unparseable values are logged and ignored rather than failing startup.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(raw) = std::env::var("ORACLE_BACKEND") {
            match raw.parse() {
                Ok(kind) => cfg.backend = kind,
                Err(e) => tracing::warn!("Ignoring ORACLE_BACKEND: {}", e),
            }
        }
        if let Ok(path) = std::env::var("ORACLE_SQLITE_PATH") {
            cfg.sqlite_path = Some(PathBuf::from(path));
        }
        env_parse("ORACLE_MAX_ASSERTIONS", &mut cfg.max_assertions);
        env_parse("ORACLE_MAX_DISPUTES", &mut cfg.max_disputes);
        env_parse("ORACLE_MAX_VOTE_ASSERTIONS", &mut cfg.max_vote_assertions);
        env_parse("ORACLE_MAX_LOG_EVENTS", &mut cfg.max_log_events);
        env_parse("ORACLE_REPLAY_CHUNK_BLOCKS", &mut cfg.replay_chunk_blocks);
        env_parse("ORACLE_LANE_QUEUE_DEPTH", &mut cfg.lane_queue_depth);

        // Zero would make every bound evict everything or stall the lanes.
        cfg.max_assertions = cfg.max_assertions.max(1);
        cfg.max_disputes = cfg.max_disputes.max(1);
        cfg.max_vote_assertions = cfg.max_vote_assertions.max(1);
        cfg.max_log_events = cfg.max_log_events.max(1);
        cfg.replay_chunk_blocks = cfg.replay_chunk_blocks.max(1);
        cfg.lane_queue_depth = cfg.lane_queue_depth.max(1);
        cfg
    }
}
