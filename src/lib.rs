// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! oracle-kernel: deterministic domain core for optimistic-oracle state reconstruction.
//!
//! Everything in this crate is pure: no I/O, no clocks, no global state.
//! The same event always decodes to the same `TypedEvent`, and the same vote
//! set always folds to the same tally. Storage and replay live in `oracle-node`.

pub mod config;
pub mod error;
pub mod types;
pub mod event;
pub mod checksum;
pub mod tally;

#[cfg(test)]
pub mod tests;
