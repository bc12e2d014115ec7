//! Search command implementation for the proximity CLI.

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use proximity_core::{
    Category, DEFAULT_SEARCH_RADIUS, FanOutOptions, GeoPoint, Geocoder, Meters, NearbyPlace,
    PlaceProvider, ProximityMatcher, RetryPolicy, SEARCH_RADIUS_BOUNDS, SearchError,
    SearchOutcome, SearchQuery,
};
use proximity_data::maps::DEFAULT_BASE_URL;
use proximity_data::{FixtureProvider, MapClient, MapClientConfig};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ADDRESS, ARG_API_KEY, ARG_BASE_URL, ARG_CATEGORIES, ARG_FIXTURE, ARG_LAT, ARG_LIMIT,
    ARG_LON, ARG_RADIUS, ARG_RETRIES, ARG_TIMEOUT_SECS, CliError, ENV_API_KEY, ENV_CATEGORIES,
    ENV_LAT, ENV_LON,
};

/// Default per-category timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Delay before the first retry of a failed category.
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Find amenities of the selected categories near a location. \
                 The origin is given as coordinates or as an address to \
                 geocode. Results are printed as JSON, nearest first. \
                 Options can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Search for nearby amenities"
)]
#[ortho_config(prefix = "PROXIMITY")]
pub(crate) struct SearchArgs {
    /// Latitude of the origin in decimal degrees.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the origin in decimal degrees.
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Address to geocode as the origin.
    #[arg(long = ARG_ADDRESS, value_name = "text")]
    #[serde(default)]
    pub(crate) address: Option<String>,
    /// Comma-separated categories, e.g. "school,hospital".
    #[arg(long = ARG_CATEGORIES, value_name = "list")]
    #[serde(default)]
    pub(crate) categories: Option<String>,
    /// Search radius in metres (500 to 10000, default 1000).
    #[arg(long = ARG_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
    /// Maximum number of places to print.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// API key for the maps service.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Root URL of the maps service.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Per-category timeout in seconds (default 8).
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Extra attempts for a category after a transient failure (default 0).
    #[arg(long = ARG_RETRIES, value_name = "count")]
    #[serde(default)]
    pub(crate) retries: Option<u32>,
    /// Answer from a recorded nearby-search JSON file instead of the service.
    #[arg(long = ARG_FIXTURE, value_name = "path")]
    #[serde(default)]
    pub(crate) fixture: Option<Utf8PathBuf>,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Where the search is centred.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Origin {
    Coordinates(GeoPoint),
    Address(String),
}

/// Where places come from.
#[derive(Clone, PartialEq, Eq)]
pub(crate) enum PlaceSource {
    Fixture(Utf8PathBuf),
    Service { api_key: String, base_url: String },
}

impl std::fmt::Debug for PlaceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixture(path) => f.debug_tuple("Fixture").field(path).finish(),
            Self::Service { base_url, .. } => f
                .debug_struct("Service")
                .field("api_key", &"<redacted>")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchConfig {
    pub(crate) origin: Origin,
    pub(crate) categories: BTreeSet<Category>,
    pub(crate) radius: Meters,
    pub(crate) limit: Option<usize>,
    pub(crate) source: PlaceSource,
    pub(crate) timeout: Duration,
    pub(crate) retries: u32,
}

impl SearchConfig {
    fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    pub(crate) fn fan_out_options(&self) -> FanOutOptions {
        FanOutOptions::default()
            .with_timeout(self.timeout)
            .with_retry(RetryPolicy::new(self.attempts(), RETRY_BACKOFF))
    }

    /// Timeout for one HTTP request.
    ///
    /// The category deadline is shared evenly between attempts, so a request
    /// that times out leaves room for the retries.
    pub(crate) fn request_timeout(&self) -> Duration {
        self.timeout / self.attempts()
    }
}

fn resolve_origin(
    lat: Option<f64>,
    lon: Option<f64>,
    address: Option<String>,
) -> Result<Origin, CliError> {
    let address = address.filter(|a| !a.trim().is_empty());
    match (lat, lon, address) {
        (Some(_), _, Some(_)) | (_, Some(_), Some(_)) => Err(CliError::ConflictingOrigin),
        (Some(lat), Some(lon), None) => Ok(Origin::Coordinates(GeoPoint::new(lat, lon)?)),
        (None, None, Some(address)) => Ok(Origin::Address(address)),
        (Some(_), None, None) => Err(CliError::MissingArgument {
            field: ARG_LON,
            env: ENV_LON,
        }),
        (None, Some(_), None) => Err(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_LAT,
        }),
        (None, None, None) => Err(CliError::MissingOrigin),
    }
}

/// Parse a comma-separated category list; blank entries are ignored.
pub(crate) fn parse_categories(list: &str) -> Result<BTreeSet<Category>, CliError> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            name.parse().map_err(|_| CliError::UnknownCategory {
                value: name.to_owned(),
            })
        })
        .collect()
}

fn resolve_radius(radius: Option<f64>) -> Result<Meters, CliError> {
    let Some(radius) = radius else {
        return Ok(DEFAULT_SEARCH_RADIUS);
    };
    if SEARCH_RADIUS_BOUNDS.contains(&radius) {
        Ok(Meters::new(radius))
    } else {
        Err(CliError::RadiusOutOfRange {
            radius,
            min: *SEARCH_RADIUS_BOUNDS.start(),
            max: *SEARCH_RADIUS_BOUNDS.end(),
        })
    }
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let origin = resolve_origin(args.lat, args.lon, args.address)?;
        let categories = args
            .categories
            .as_deref()
            .ok_or(CliError::MissingArgument {
                field: ARG_CATEGORIES,
                env: ENV_CATEGORIES,
            })
            .and_then(parse_categories)?;
        let radius = resolve_radius(args.radius)?;

        let timeout_secs = args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(CliError::ZeroTimeout);
        }

        let source = match args.fixture {
            Some(path) => PlaceSource::Fixture(path),
            None => PlaceSource::Service {
                api_key: args
                    .api_key
                    .filter(|key| !key.trim().is_empty())
                    .ok_or(CliError::MissingArgument {
                        field: ARG_API_KEY,
                        env: ENV_API_KEY,
                    })?,
                base_url: args.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            },
        };

        Ok(Self {
            origin,
            categories,
            radius,
            limit: args.limit,
            source,
            timeout: Duration::from_secs(timeout_secs),
            retries: args.retries.unwrap_or_default(),
        })
    }
}

/// Data sources for one search invocation.
pub(crate) struct SearchBackend {
    pub(crate) provider: Arc<dyn PlaceProvider>,
    pub(crate) geocoder: Option<Arc<dyn Geocoder>>,
}

/// Builds the data sources for the current search invocation.
pub(crate) trait SearchBackendBuilder {
    fn build(&self, config: &SearchConfig) -> Result<SearchBackend, CliError>;
}

pub(crate) struct DefaultSearchBackendBuilder;

impl SearchBackendBuilder for DefaultSearchBackendBuilder {
    fn build(&self, config: &SearchConfig) -> Result<SearchBackend, CliError> {
        match &config.source {
            PlaceSource::Fixture(path) => Ok(SearchBackend {
                provider: Arc::new(FixtureProvider::from_path(path)?),
                geocoder: None,
            }),
            PlaceSource::Service { api_key, base_url } => {
                let client = Arc::new(MapClient::init(
                    MapClientConfig::new(api_key.clone())
                        .with_base_url(base_url.clone())
                        .with_timeout(config.request_timeout()),
                )?);
                Ok(SearchBackend {
                    provider: client.clone(),
                    geocoder: Some(client),
                })
            }
        }
    }
}

/// A category that contributed no places, as printed.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct FailureReport {
    pub(crate) category: Category,
    pub(crate) error: String,
}

/// JSON document printed by the `search` command.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SearchReport {
    pub(crate) places: Vec<NearbyPlace>,
    pub(crate) failures: Vec<FailureReport>,
}

impl From<SearchOutcome> for SearchReport {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            places: outcome.places,
            failures: outcome
                .failures
                .into_iter()
                .map(|failure| FailureReport {
                    category: failure.category,
                    error: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultSearchBackendBuilder;
    run_search_with(args, &builder, &mut stdout)
}

pub(crate) fn run_search_with(
    args: SearchArgs,
    builder: &dyn SearchBackendBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let backend = builder.build(&config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let outcome = runtime.block_on(execute_search(&config, backend))?;
    info!(
        "found {} places; {} categories failed",
        outcome.places.len(),
        outcome.failures.len()
    );
    write_search_report(writer, &SearchReport::from(outcome))
}

async fn execute_search(
    config: &SearchConfig,
    backend: SearchBackend,
) -> Result<SearchOutcome, CliError> {
    let matcher =
        ProximityMatcher::new(backend.provider).with_options(config.fan_out_options());
    match &config.origin {
        Origin::Coordinates(origin) => {
            let query = SearchQuery::new(*origin, config.categories.clone(), config.radius)
                .map_err(SearchError::from)?;
            Ok(matcher.find_nearby(&query, config.limit).await)
        }
        Origin::Address(address) => {
            let geocoder = backend.geocoder.ok_or(CliError::GeocoderUnavailable)?;
            let outcome = matcher
                .find_nearby_address(
                    geocoder.as_ref(),
                    address,
                    config.categories.clone(),
                    config.radius,
                    config.limit,
                )
                .await?;
            Ok(outcome)
        }
    }
}

fn write_search_report(writer: &mut dyn Write, report: &SearchReport) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerialiseReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchConfig::try_from(merged)
}
