// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::PathBuf;

use oracle_kernel::types::Assertion;
use oracle_node::store::StateStore;

use super::{new_table, open_db, opt, ts};

/// Show one assertion, or list the instance's assertions when `id` is absent.
pub fn run(db: Option<PathBuf>, instance: &str, id: Option<&str>, limit: u64) -> anyhow::Result<Vec<Assertion>> {
    let store = open_db(db)?;

    let Some(id) = id else {
        let all = store.list_assertions(instance, limit)?;
        let mut table = new_table(vec!["ID", "Chain", "Status", "Asserter", "Resolution"]);
        for a in &all {
            table.add_row(vec![
                a.id.clone(),
                a.chain.clone(),
                a.status.to_string(),
                opt(a.asserter.as_deref()),
                opt(a.settlement_resolution),
            ]);
        }
        println!("\nAssertions in {instance} ({} shown)\n", all.len());
        println!("{table}\n");
        return Ok(all);
    };

    match store.get_assertion(id, instance)? {
        Some(a) => {
            let mut table = new_table(vec!["Field", "Value"]);
            table.add_row(vec!["ID".to_string(), a.id.clone()]);
            table.add_row(vec!["Chain".to_string(), a.chain.clone()]);
            table.add_row(vec!["Status".to_string(), a.status.to_string()]);
            table.add_row(vec!["Asserter".to_string(), opt(a.asserter.as_deref())]);
            table.add_row(vec!["Claim".to_string(), opt(a.claim.as_deref())]);
            table.add_row(vec!["Market".to_string(), opt(a.market.as_deref())]);
            table.add_row(vec!["Bond".to_string(), opt(a.bond)]);
            table.add_row(vec!["Currency".to_string(), opt(a.currency.as_deref())]);
            table.add_row(vec!["Asserted at".to_string(), ts(a.asserted_at)]);
            table.add_row(vec!["Liveness ends".to_string(), ts(a.liveness_ends_at)]);
            table.add_row(vec!["Disputer".to_string(), opt(a.disputer.as_deref())]);
            table.add_row(vec!["Disputed at".to_string(), ts(a.disputed_at)]);
            table.add_row(vec!["Resolved at".to_string(), ts(a.resolved_at)]);
            table.add_row(vec!["Resolution".to_string(), opt(a.settlement_resolution)]);
            println!("\nAssertion {id}\n");
            println!("{table}\n");
            Ok(vec![a])
        }
        None => {
            println!("\nNo assertion {id} in {instance}\n");
            Ok(Vec::new())
        }
    }
}
