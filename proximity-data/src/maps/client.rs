//! HTTP client for a Places-style nearby-search and geocoding service.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use proximity_core::{
    Category, GeoPoint, GeocodeError, Geocoder, Meters, PlaceProvider, ProviderError, RawPlace,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::response::{
    GeocodeResponse, NearbySearchResponse, STATUS_OK, STATUS_ZERO_RESULTS,
};

/// Default service root.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Default user agent for service requests.
pub const DEFAULT_USER_AGENT: &str = "proximity/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const NEARBY_SEARCH_PATH: &str = "maps/api/place/nearbysearch/json";
const GEOCODE_PATH: &str = "maps/api/geocode/json";

/// Errors raised by [`MapClient::init`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key was configured.
    #[error("an API key is required to call the maps service")]
    MissingApiKey,
    /// The base URL could not be parsed or cannot carry a path.
    #[error("invalid maps base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// Configured base URL.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Configuration for [`MapClient`].
#[derive(Clone)]
pub struct MapClientConfig {
    /// Service API key, appended to every request.
    pub api_key: String,
    /// Service root, e.g. `"https://maps.googleapis.com"`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl fmt::Debug for MapClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl MapClientConfig {
    /// Create a configuration for the default service with `api_key`.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Set the service root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Transport failures shared by both endpoints.
#[derive(Debug)]
enum FetchError {
    Timeout,
    Http { status: u16 },
    Network { message: String },
    Parse { message: String },
}

/// Client for the nearby-search and geocoding endpoints.
///
/// Construct one with [`MapClient::init`] at the composition root and pass it
/// by reference; the client holds a connection pool and is cheap to share.
///
/// URLs reported in errors and logs never include the API key.
pub struct MapClient {
    client: Client,
    api_key: String,
    nearby_url: Url,
    geocode_url: Url,
    timeout: Duration,
}

impl fmt::Debug for MapClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapClient")
            .field("api_key", &"<redacted>")
            .field("nearby_url", &self.nearby_url.as_str())
            .field("geocode_url", &self.geocode_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MapClient {
    /// Validate `config` and build a client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] for a blank key,
    /// [`ConfigError::InvalidBaseUrl`] when the base URL does not parse, and
    /// [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn init(config: MapClientConfig) -> Result<Self, ConfigError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let base = parse_base_url(&config.base_url)?;
        let endpoint = |path: &str| {
            base.join(path).map_err(|source| ConfigError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            })
        };
        let nearby_url = endpoint(NEARBY_SEARCH_PATH)?;
        let geocode_url = endpoint(GEOCODE_PATH)?;

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            nearby_url,
            geocode_url,
            timeout: config.timeout,
        })
    }

    /// Nearby-search URL for one category, without the API key.
    fn nearby_search_url(&self, origin: &GeoPoint, radius: Meters, category: Category) -> Url {
        let mut url = self.nearby_url.clone();
        url.query_pairs_mut()
            .append_pair("location", &origin.to_string())
            .append_pair("radius", &format!("{:.0}", radius.get().ceil()))
            .append_pair("type", category.as_str());
        url
    }

    /// Geocoding URL for `address`, without the API key.
    fn geocode_address_url(&self, address: &str) -> Url {
        let mut url = self.geocode_url.clone();
        url.query_pairs_mut().append_pair("address", address);
        url
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Fetch and decode `url`, adding the API key only to the outgoing request.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let mut signed = url.clone();
        signed.query_pairs_mut().append_pair("key", &self.api_key);

        let response = self
            .client
            .get(signed)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(convert_reqwest_error)?;

        response.json().await.map_err(|err| FetchError::Parse {
            message: err.without_url().to_string(),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |source| ConfigError::InvalidBaseUrl {
        url: raw.to_owned(),
        source,
    };
    let mut url = Url::parse(raw.trim()).map_err(invalid)?;
    if url.cannot_be_a_base() {
        return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
    }
    // `Url::join` replaces the last segment unless the path ends with a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn convert_reqwest_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        return FetchError::Timeout;
    }
    if let Some(status) = error.status() {
        return FetchError::Http {
            status: status.as_u16(),
        };
    }
    FetchError::Network {
        message: error.without_url().to_string(),
    }
}

fn provider_error(error: FetchError, url: &Url, timeout_ms: u64) -> ProviderError {
    let url = url.to_string();
    match error {
        FetchError::Timeout => ProviderError::Timeout { timeout_ms },
        FetchError::Http { status } => ProviderError::Http { url, status },
        FetchError::Network { message } => ProviderError::Network { url, message },
        FetchError::Parse { message } => ProviderError::Parse { message },
    }
}

fn geocode_error(error: FetchError, url: &Url, timeout_ms: u64) -> GeocodeError {
    let url = url.to_string();
    match error {
        FetchError::Timeout => GeocodeError::Timeout { timeout_ms },
        FetchError::Http { status } => GeocodeError::Network {
            url,
            message: format!("HTTP status {status}"),
        },
        FetchError::Network { message } => GeocodeError::Network { url, message },
        FetchError::Parse { message } => GeocodeError::Parse { message },
    }
}

/// Interpret a nearby-search response.
fn nearby_places(response: NearbySearchResponse) -> Result<Vec<RawPlace>, ProviderError> {
    if !response.is_success() {
        return Err(ProviderError::Service {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        });
    }
    Ok(response.into_raw_places())
}

/// Interpret a geocoding response, taking the first match.
fn geocoded_location(address: &str, response: GeocodeResponse) -> Result<GeoPoint, GeocodeError> {
    match response.status.as_str() {
        STATUS_OK => {}
        STATUS_ZERO_RESULTS => {
            return Err(GeocodeError::NotFound {
                address: address.to_owned(),
            });
        }
        _ => {
            return Err(GeocodeError::Service {
                status: response.status,
                message: response.error_message.unwrap_or_default(),
            });
        }
    }
    let first = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NotFound {
            address: address.to_owned(),
        })?;
    let location = first.geometry.location;
    GeoPoint::new(location.lat, location.lng).map_err(|err| GeocodeError::InvalidLocation {
        message: err.to_string(),
    })
}

#[async_trait]
impl PlaceProvider for MapClient {
    async fn nearby(
        &self,
        origin: &GeoPoint,
        radius: Meters,
        category: Category,
    ) -> Result<Vec<RawPlace>, ProviderError> {
        let url = self.nearby_search_url(origin, radius, category);
        debug!("GET {url}");
        let response: NearbySearchResponse = self
            .get_json(&url)
            .await
            .map_err(|err| provider_error(err, &url, self.timeout_ms()))?;
        nearby_places(response)
    }
}

#[async_trait]
impl Geocoder for MapClient {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        let url = self.geocode_address_url(address);
        debug!("GET {url}");
        let response: GeocodeResponse = self
            .get_json(&url)
            .await
            .map_err(|err| geocode_error(err, &url, self.timeout_ms()))?;
        geocoded_location(address, response)
    }
}
