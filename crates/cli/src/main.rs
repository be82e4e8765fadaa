// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::{Parser, Subcommand};
use oracle_cli::commands::{assertion, dispute, ingest, replay, votes};
use oracle_node::telemetry;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oracle")]
#[command(about = "Oracle reconciliation CLI - replay the event log into assertion and dispute state", long_about = None)]
struct Cli {
    /// SQLite database holding the event log and state (defaults to ORACLE_SQLITE_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Instance to operate on
    #[arg(long, short, global = true, default_value = "default")]
    instance: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append events from a JSON-lines file to the log
    Ingest {
        file: PathBuf,

        /// Compute payload checksums for lines that have none
        #[arg(long)]
        stamp: bool,
    },
    /// Replay a block range into state
    Replay {
        #[arg(long)]
        from: u64,

        #[arg(long)]
        to: u64,

        /// Blocks per chunk (defaults to ORACLE_REPLAY_CHUNK_BLOCKS)
        #[arg(long)]
        chunk: Option<u64>,

        /// Print Prometheus metrics after the replay
        #[arg(long)]
        metrics: bool,
    },
    /// Show an assertion, or list assertions when no id is given
    Assertion {
        id: Option<String>,

        #[arg(long, default_value_t = 50)]
        limit: u64,
    },
    /// Show a dispute by dispute id or assertion id
    Dispute {
        id: String,
    },
    /// List the votes recorded for an assertion
    Votes {
        assertion_id: String,
    },
}

fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { file, stamp } => ingest::run(cli.db, &file, &cli.instance, stamp).map(|_| ()),
        Commands::Replay {
            from,
            to,
            chunk,
            metrics,
        } => {
            let report = replay::run(cli.db, &cli.instance, from, to, chunk, metrics)?;
            if report.failed > 0 {
                anyhow::bail!("{} events failed to apply", report.failed);
            }
            if report.fetch_failures > 0 {
                anyhow::bail!("{} chunks could not be read", report.fetch_failures);
            }
            Ok(())
        }
        Commands::Assertion { id, limit } => assertion::run(cli.db, &cli.instance, id.as_deref(), limit).map(|_| ()),
        Commands::Dispute { id } => dispute::run(cli.db, &cli.instance, &id).map(|_| ()),
        Commands::Votes { assertion_id } => votes::run(cli.db, &cli.instance, &assertion_id).map(|_| ()),
    }
}
