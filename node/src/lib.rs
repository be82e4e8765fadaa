// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod config;
pub mod errors;
pub mod telemetry;
pub mod store;
pub mod events;
pub mod aggregate;
pub mod lanes;
pub mod service;
