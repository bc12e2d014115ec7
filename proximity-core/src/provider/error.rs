use thiserror::Error;

/// Errors from [`crate::provider::PlaceProvider::nearby`].
///
/// The fan-out treats every variant as a soft failure of one category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The call did not complete before its deadline.
    #[error("provider request timed out after {timeout_ms} ms")]
    Timeout {
        /// Deadline that expired, in milliseconds.
        timeout_ms: u64,
    },
    /// The request never produced an HTTP response.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Endpoint that was called, without credentials.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("provider returned HTTP {status} for {url}")]
    Http {
        /// Endpoint that was called, without credentials.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The provider answered but reported an error status in its payload.
    #[error("provider reported {status}: {message}")]
    Service {
        /// Provider status string, e.g. `"OVER_QUERY_LIMIT"`.
        status: String,
        /// Provider error message, possibly empty.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse provider response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },
    /// The provider cannot serve requests at all (e.g. a stub with no data).
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Reason the provider is unavailable.
        message: String,
    },
}

impl ProviderError {
    /// Whether repeating the same call might succeed.
    ///
    /// Timeouts, transport failures, server-side HTTP errors and transient
    /// provider statuses are retryable; client errors and decoding failures
    /// are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::Service { status, .. } => {
                matches!(status.as_str(), "UNKNOWN_ERROR" | "OVER_QUERY_LIMIT")
            }
            Self::Parse { .. } | Self::Unavailable { .. } => false,
        }
    }
}

/// Errors from [`crate::provider::Geocoder::geocode`].
///
/// Unlike [`ProviderError`], a geocoding failure aborts the search: there is
/// no origin to search around.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The address was blank.
    #[error("address must not be empty")]
    EmptyAddress,
    /// The service found no match for the address.
    #[error("no location found for address {address:?}")]
    NotFound {
        /// Address that was looked up.
        address: String,
    },
    /// The service returned a location outside valid coordinate ranges.
    #[error("geocoder returned an invalid location: {message}")]
    InvalidLocation {
        /// Validation error description.
        message: String,
    },
    /// The call did not complete before its deadline.
    #[error("geocode request timed out after {timeout_ms} ms")]
    Timeout {
        /// Deadline that expired, in milliseconds.
        timeout_ms: u64,
    },
    /// Transport or HTTP failure.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Endpoint that was called, without credentials.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The service reported an error status.
    #[error("geocoder reported {status}: {message}")]
    Service {
        /// Service status string.
        status: String,
        /// Service error message, possibly empty.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse geocode response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },
}
