// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Vote tallies.
//!
//! A tally is always a fold over the complete vote set of one assertion.
//! There is deliberately no `add_vote`: incremental patching is how replayed
//! or late votes end up double counted.

use serde::{Deserialize, Serialize};

use crate::types::VoteEvent;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    #[serde(with = "crate::types::amount")]
    pub votes_for: u128,
    #[serde(with = "crate::types::amount")]
    pub votes_against: u128,
    #[serde(with = "crate::types::amount")]
    pub total: u128,
}

impl VoteTally {
    /// Sum weights over every vote. Saturates instead of wrapping.
    pub fn from_votes<'a, I>(votes: I) -> Self
    where
        I: IntoIterator<Item = &'a VoteEvent>,
    {
        votes.into_iter().fold(Self::default(), |mut acc, vote| {
            if vote.support {
                acc.votes_for = acc.votes_for.saturating_add(vote.weight);
            } else {
                acc.votes_against = acc.votes_against.saturating_add(vote.weight);
            }
            acc.total = acc.total.saturating_add(vote.weight);
            acc
        })
    }
}
