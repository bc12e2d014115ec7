//! Adapters connecting the proximity matcher to real data sources.
//!
//! Responsibilities:
//! - Implement the core provider and geocoder ports over HTTP.
//! - Load recorded responses from disk for offline runs and tests.
//!
//! Boundaries:
//! - Do not encode matching rules (live in `proximity-core`).
//! - Never expose the service API key in errors, logs or `Debug` output.
//!
//! Invariants:
//! - No global mutable state; clients are built once and passed by reference.

pub mod fixture;
pub mod maps;

pub use fixture::{FixtureError, FixtureProvider};
pub use maps::{ConfigError, MapClient, MapClientConfig};
