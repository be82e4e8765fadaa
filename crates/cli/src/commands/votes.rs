// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::PathBuf;

use oracle_kernel::tally::VoteTally;
use oracle_kernel::types::VoteEvent;
use oracle_node::store::StateStore;

use super::{new_table, open_db};

pub fn run(db: Option<PathBuf>, instance: &str, assertion_id: &str) -> anyhow::Result<Vec<VoteEvent>> {
    let store = open_db(db)?;
    let votes = store.vote_events(assertion_id, instance)?;

    let mut table = new_table(vec!["Block", "Log", "Voter", "Support", "Weight", "Tx"]);
    for v in &votes {
        table.add_row(vec![
            v.block_number.to_string(),
            v.log_index.to_string(),
            v.voter.clone(),
            if v.support { "for" } else { "against" }.to_string(),
            v.weight.to_string(),
            v.tx_hash.clone(),
        ]);
    }

    let tally = VoteTally::from_votes(&votes);
    println!("\nVotes for {assertion_id} in {instance}\n");
    println!("{table}\n");
    println!(
        "Tally: {} for / {} against / {} total\n",
        tally.votes_for, tally.votes_against, tally.total
    );
    Ok(votes)
}
