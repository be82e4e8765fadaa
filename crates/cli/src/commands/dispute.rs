// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::PathBuf;

use oracle_kernel::types::id::{assertion_id_of, dispute_id_for};
use oracle_kernel::types::Dispute;
use oracle_node::store::StateStore;

use super::{new_table, open_db, opt, ts};

/// `id` may be either the dispute id (`D:<assertion>`) or the assertion id.
pub fn run(db: Option<PathBuf>, instance: &str, id: &str) -> anyhow::Result<Option<Dispute>> {
    let store = open_db(db)?;
    let dispute_id = match assertion_id_of(id) {
        Some(_) => id.to_string(),
        None => dispute_id_for(id),
    };

    let Some(d) = store.get_dispute(&dispute_id, instance)? else {
        println!("\nNo dispute {dispute_id} in {instance}\n");
        return Ok(None);
    };

    let mut table = new_table(vec!["Field", "Value"]);
    table.add_row(vec!["ID".to_string(), d.id.clone()]);
    table.add_row(vec!["Assertion".to_string(), d.assertion_id.clone()]);
    table.add_row(vec!["Chain".to_string(), d.chain.clone()]);
    table.add_row(vec!["Status".to_string(), d.status.to_string()]);
    table.add_row(vec!["Disputer".to_string(), opt(d.disputer.as_deref())]);
    table.add_row(vec!["Votes for".to_string(), d.current_votes_for.to_string()]);
    table.add_row(vec!["Votes against".to_string(), d.current_votes_against.to_string()]);
    table.add_row(vec!["Total votes".to_string(), d.total_votes.to_string()]);
    table.add_row(vec!["Disputed at".to_string(), ts(d.disputed_at)]);
    table.add_row(vec!["Voting ends".to_string(), ts(d.voting_ends_at)]);
    println!("\nDispute {dispute_id}\n");
    println!("{table}\n");
    Ok(Some(d))
}
