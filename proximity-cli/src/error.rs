//! Error types emitted by the proximity CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use proximity_core::{GeoPointError, SearchError};
use proximity_data::{ConfigError, FixtureError};
use thiserror::Error;

/// Errors emitted by the proximity CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// Neither coordinates nor an address were given.
    #[error("missing search origin (set --lat and --lon, or --address)")]
    MissingOrigin,
    /// Both coordinates and an address were given.
    #[error("give either --lat/--lon or --address, not both")]
    ConflictingOrigin,
    /// The coordinates were out of range.
    #[error("invalid origin: {0}")]
    InvalidOrigin(#[from] GeoPointError),
    /// A category name was not recognised.
    #[error("unknown category {value:?}")]
    UnknownCategory { value: String },
    /// The radius was outside the supported range.
    #[error("radius {radius} m is outside the supported range of {min}..={max} m")]
    RadiusOutOfRange { radius: f64, min: f64, max: f64 },
    /// The per-category timeout was zero.
    #[error("--timeout-secs must be at least 1")]
    ZeroTimeout,
    /// Loading the offline fixture failed.
    #[error(transparent)]
    LoadFixture(#[from] FixtureError),
    /// The maps client rejected its configuration.
    #[error("failed to configure maps client: {0}")]
    ConfigureClient(#[from] ConfigError),
    /// An address search was requested without a geocoding service.
    #[error("--address requires the maps service; it cannot be used with --fixture")]
    GeocoderUnavailable,
    /// The search was aborted.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Serialising the search report failed.
    #[error("failed to serialise search results: {0}")]
    SerialiseReport(#[source] serde_json::Error),
    /// Writing the search report failed.
    #[error("failed to write search results: {0}")]
    WriteOutput(#[source] std::io::Error),
}
