//! Facade crate for the proximity amenity matcher.
//!
//! This crate re-exports the core domain types and search pipeline, and
//! exposes the maps service adapter behind the `http` feature.

#![forbid(unsafe_code)]

pub use proximity_core::{
    Candidate, CandidateBatch, Category, CategoryFailure, FanOutOptions, GeoPoint, GeoPointError,
    GeocodeError, Geocoder, MatchResult, Meters, MemoryPlaceProvider, NearbyPlace, PlaceProvider,
    ProviderError, ProximityMatcher, RankedMatches, RawPlace, RetryPolicy, SearchError,
    SearchOutcome, SearchQuery, SearchQueryError, SearchSession, SessionOutcome, SessionSnapshot,
    distance, match_candidates, query_candidates,
};

#[cfg(feature = "http")]
pub use proximity_data::{ConfigError, FixtureError, FixtureProvider, MapClient, MapClientConfig};
