//! HTTP adapters for a Places-style maps service.
//!
//! [`MapClient`] implements both [`proximity_core::PlaceProvider`] (one
//! nearby-search request per category) and [`proximity_core::Geocoder`]
//! (address lookup) against the service's JSON endpoints.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeSet;
//! use std::time::Duration;
//! use proximity_core::{Category, GeoPoint, Meters, ProximityMatcher, SearchQuery};
//! use proximity_data::maps::{MapClient, MapClientConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MapClientConfig::new("api-key").with_timeout(Duration::from_secs(5));
//! let matcher = ProximityMatcher::new(MapClient::init(config)?);
//! let query = SearchQuery::new(
//!     GeoPoint::new(1.3, 103.8)?,
//!     BTreeSet::from([Category::School, Category::Hospital]),
//!     Meters::new(1000.0),
//! )?;
//! let outcome = matcher.find_nearby(&query, Some(20)).await;
//! println!("{} places", outcome.places.len());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod response;

pub use client::{ConfigError, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, MapClient, MapClientConfig};
