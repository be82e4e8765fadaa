// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Event Applier
//!
//! One handler per [`TypedEvent`] variant, each an idempotent function of
//! (event, current store contents). Handlers return `Ok(true)` when the
//! event was applied, `Ok(false)` when it was skipped as unusable, and `Err`
//! only when the store itself failed.
//!
//! # Transitions
//! - `assertion_created`: upsert Pending (existing lifecycle fields kept)
//! - `assertion_disputed`: assertion -> Disputed if present; dispute upserted in Voting
//! - `vote_cast`: vote appended, dispute tallies recounted from scratch
//! - `assertion_resolved`: assertion -> Resolved, dispute -> Executed, if present

use std::sync::Arc;

use oracle_kernel::config::{DEFAULT_VOTE_WEIGHT, UNKNOWN_CHAIN};
use oracle_kernel::error::DecodeError;
use oracle_kernel::event::{AssertionCreated, AssertionDisputed, AssertionResolved, OracleEvent, TypedEvent, VoteCast};
use oracle_kernel::types::id::dispute_id_for;
use oracle_kernel::types::{Assertion, Dispute, DisputeStatus, VoteEvent};

use crate::aggregate::VoteAggregator;
use crate::errors::StoreResult;
use crate::store::StateStore;

#[derive(Clone)]
pub struct EventApplier {
    store: Arc<dyn StateStore>,
}

impl EventApplier {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Decode and dispatch one event.
    pub fn apply(&self, event: &OracleEvent, instance_id: &str) -> StoreResult<bool> {
        let typed = match TypedEvent::decode(event) {
            Ok(typed) => typed,
            Err(DecodeError::UnknownEventType(kind)) => {
                tracing::warn!(
                    "Skipping event {} (block {}): no handler for type {:?}",
                    event.id,
                    event.block_number,
                    kind
                );
                return Ok(false);
            }
            Err(err @ DecodeError::Schema { .. }) => {
                tracing::warn!("Skipping event {} (block {}): {}", event.id, event.block_number, err);
                return Ok(false);
            }
        };

        match typed {
            TypedEvent::AssertionCreated(body) => self.on_assertion_created(body, instance_id),
            TypedEvent::AssertionDisputed { assertion_id, body } => {
                self.on_assertion_disputed(&assertion_id, body, instance_id)
            }
            TypedEvent::VoteCast { assertion_id, body } => self.on_vote_cast(&assertion_id, body, event, instance_id),
            TypedEvent::AssertionResolved { assertion_id, body } => {
                self.on_assertion_resolved(&assertion_id, body, instance_id)
            }
        }
    }

    fn on_assertion_created(&self, body: AssertionCreated, instance_id: &str) -> StoreResult<bool> {
        let assertion = match self.store.get_assertion(&body.id, instance_id)? {
            // Replayed create: refresh descriptive fields, keep lifecycle state.
            Some(existing) => Assertion {
                chain: body.chain.unwrap_or(existing.chain),
                asserter: body.asserter.or(existing.asserter),
                claim: body.claim.or(existing.claim),
                market: body.market.or(existing.market),
                bond: body.bond.or(existing.bond),
                currency: body.currency.or(existing.currency),
                identifier: body.identifier.or(existing.identifier),
                asserted_at: body.asserted_at.or(existing.asserted_at),
                liveness_ends_at: body.liveness_ends_at.or(existing.liveness_ends_at),
                tx_hash: body.tx_hash.or(existing.tx_hash),
                ..existing
            },
            None => Assertion {
                asserter: body.asserter,
                claim: body.claim,
                market: body.market,
                bond: body.bond,
                currency: body.currency,
                identifier: body.identifier,
                asserted_at: body.asserted_at,
                liveness_ends_at: body.liveness_ends_at,
                tx_hash: body.tx_hash,
                ..Assertion::pending(body.id, body.chain.unwrap_or_else(|| UNKNOWN_CHAIN.to_string()))
            },
        };

        self.store.put_assertion(&assertion, instance_id)?;
        tracing::debug!("Assertion {} upserted ({})", assertion.id, assertion.status);
        Ok(true)
    }

    fn on_assertion_disputed(&self, assertion_id: &str, body: AssertionDisputed, instance_id: &str) -> StoreResult<bool> {
        let assertion = self.store.get_assertion(assertion_id, instance_id)?;
        let chain = body
            .chain
            .clone()
            .or_else(|| assertion.as_ref().map(|a| a.chain.clone()));

        match assertion {
            Some(mut a) => {
                a.mark_disputed(body.disputer.clone(), body.disputed_at);
                self.store.put_assertion(&a, instance_id)?;
            }
            None => {
                tracing::debug!(
                    "Dispute for unknown assertion {} in {}; recording dispute only",
                    assertion_id,
                    instance_id
                );
            }
        }

        let mut dispute = match self.store.get_dispute(&dispute_id_for(assertion_id), instance_id)? {
            Some(d) => d,
            None => Dispute::open(assertion_id, chain.clone().unwrap_or_else(|| UNKNOWN_CHAIN.to_string())),
        };
        if !dispute.status.is_terminal() {
            dispute.status = DisputeStatus::Voting;
        }
        if let Some(chain) = chain {
            dispute.chain = chain;
        }
        if body.disputer.is_some() {
            dispute.disputer = body.disputer;
        }
        if body.disputed_at.is_some() {
            dispute.disputed_at = body.disputed_at;
        }
        if body.voting_ends_at.is_some() && !dispute.status.is_terminal() {
            dispute.voting_ends_at = body.voting_ends_at;
        }

        self.store.put_dispute(&dispute, instance_id)?;
        tracing::debug!("Dispute {} upserted ({})", dispute.id, dispute.status);
        Ok(true)
    }

    fn on_vote_cast(&self, assertion_id: &str, body: VoteCast, event: &OracleEvent, instance_id: &str) -> StoreResult<bool> {
        let chain = match body.chain {
            Some(chain) => chain,
            None => self
                .store
                .get_assertion(assertion_id, instance_id)?
                .map_or_else(|| UNKNOWN_CHAIN.to_string(), |a| a.chain),
        };

        let vote = VoteEvent {
            chain,
            assertion_id: assertion_id.to_string(),
            voter: body.voter,
            support: body.support,
            weight: body.weight.unwrap_or(DEFAULT_VOTE_WEIGHT),
            tx_hash: body.tx_hash.unwrap_or_default(),
            block_number: event.block_number,
            log_index: event.log_index,
        };

        self.store.put_vote_event(&vote, instance_id)?;
        VoteAggregator::recompute(self.store.as_ref(), assertion_id, instance_id)?;
        Ok(true)
    }

    fn on_assertion_resolved(&self, assertion_id: &str, body: AssertionResolved, instance_id: &str) -> StoreResult<bool> {
        if let Some(mut a) = self.store.get_assertion(assertion_id, instance_id)? {
            a.mark_resolved(body.resolved_at, body.settlement_resolution);
            self.store.put_assertion(&a, instance_id)?;
            tracing::debug!("Assertion {} resolved ({:?})", a.id, a.settlement_resolution);
        } else {
            tracing::debug!("Resolution for unknown assertion {} in {}", assertion_id, instance_id);
        }

        if let Some(mut d) = self.store.get_dispute(&dispute_id_for(assertion_id), instance_id)? {
            d.mark_executed(body.resolved_at);
            self.store.put_dispute(&d, instance_id)?;
            tracing::debug!("Dispute {} executed", d.id);
        }
        Ok(true)
    }
}
