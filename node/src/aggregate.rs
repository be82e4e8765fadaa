// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Vote Aggregator
//!
//! Rewrites a dispute's tallies from the full stored vote set. Never adds a
//! delta: a replayed, late or duplicated vote can only change the result by
//! changing the set itself.

use oracle_kernel::config::UNKNOWN_CHAIN;
use oracle_kernel::tally::VoteTally;
use oracle_kernel::types::id::dispute_id_for;
use oracle_kernel::types::Dispute;

use crate::errors::StoreResult;
use crate::store::StateStore;

pub struct VoteAggregator;

impl VoteAggregator {
    /// Recount every vote for `assertion_id` and write the tally onto its
    /// dispute, opening one in `Voting` if none exists yet.
    ///
    /// Status is never touched, so an Executed dispute stays Executed.
    pub fn recompute(store: &dyn StateStore, assertion_id: &str, instance_id: &str) -> StoreResult<Dispute> {
        let votes = store.vote_events(assertion_id, instance_id)?;
        let tally = VoteTally::from_votes(&votes);

        let dispute_id = dispute_id_for(assertion_id);
        let mut dispute = match store.get_dispute(&dispute_id, instance_id)? {
            Some(d) => d,
            None => {
                let chain = votes.first().map_or(UNKNOWN_CHAIN, |v| v.chain.as_str());
                tracing::debug!(
                    "Votes for {} arrived before its dispute; opening {}",
                    assertion_id,
                    dispute_id
                );
                Dispute::open(assertion_id, chain)
            }
        };

        if dispute.tally() != tally {
            tracing::debug!(
                "Tally for {} in {}: for={} against={} total={}",
                dispute_id,
                instance_id,
                tally.votes_for,
                tally.votes_against,
                tally.total
            );
        }
        dispute.set_tally(tally);
        store.put_dispute(&dispute, instance_id)?;
        Ok(dispute)
    }
}
