//! Response types for the nearby-search and geocoding endpoints.
//!
//! Both endpoints wrap their payload in the same envelope: a `status` string,
//! a `results` array and an optional `error_message`. `OK` carries results,
//! `ZERO_RESULTS` means an empty answer, and any other status is an error.

use log::warn;
use proximity_core::{GeoPoint, RawPlace};
use serde::Deserialize;

/// Status for a successful request with results.
pub const STATUS_OK: &str = "OK";

/// Status for a successful request that matched nothing.
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Envelope shared by both endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Request status, e.g. `"OK"` or `"OVER_QUERY_LIMIT"`.
    pub status: String,
    /// Matches; absent on some error responses.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Human-readable detail accompanying an error status.
    pub error_message: Option<String>,
}

impl<T> Envelope<T> {
    /// Whether the status indicates a successful request.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK || self.status == STATUS_ZERO_RESULTS
    }
}

/// Nearby-search response.
pub type NearbySearchResponse = Envelope<PlaceResult>;

/// Geocoding response.
pub type GeocodeResponse = Envelope<GeocodeResult>;

/// `geometry` object common to both result kinds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Geometry {
    /// Position of the result.
    pub location: LatLng,
}

/// Latitude/longitude pair as the service encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// One place in a nearby-search response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceResult {
    /// Stable place identifier.
    pub place_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Position of the place.
    pub geometry: Geometry,
    /// Category tags such as `"school"` or `"point_of_interest"`.
    #[serde(default)]
    pub types: Vec<String>,
    /// Average user rating.
    pub rating: Option<f32>,
}

impl PlaceResult {
    /// Convert into a [`RawPlace`], or `None` when the coordinates are invalid.
    #[must_use]
    pub fn into_raw_place(self) -> Option<RawPlace> {
        let LatLng { lat, lng } = self.geometry.location;
        match GeoPoint::new(lat, lng) {
            Ok(location) => Some(RawPlace {
                place_id: self.place_id,
                name: self.name,
                location,
                tags: self.types,
                rating: self.rating,
            }),
            Err(err) => {
                warn!("skipping place {}: {err}", self.place_id);
                None
            }
        }
    }
}

/// One match in a geocoding response.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    /// Normalised address of the match.
    #[serde(default)]
    pub formatted_address: String,
    /// Position of the match.
    pub geometry: Geometry,
}

impl NearbySearchResponse {
    /// Places with valid coordinates, in response order.
    #[must_use]
    pub fn into_raw_places(self) -> Vec<RawPlace> {
        self.results
            .into_iter()
            .filter_map(PlaceResult::into_raw_place)
            .collect()
    }
}
