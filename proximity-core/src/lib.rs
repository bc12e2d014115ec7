//! Core domain types and search pipeline for proximity amenity matching.
//!
//! Given an origin and a set of amenity categories, a search asks a
//! [`PlaceProvider`] for nearby places once per category, then filters,
//! measures, ranks and projects the combined results. Distances are always
//! expressed in [`Meters`].
//!
//! The provider and geocoder are traits so adapters for remote services live
//! in separate crates and tests can substitute the doubles in
//! [`test_support`].

mod candidate;
mod category;
pub mod distance;
pub mod fanout;
mod geo_point;
mod matcher;
mod memory;
pub mod pipeline;
pub mod provider;
mod query;
mod session;
mod units;

#[doc(hidden)]
pub mod test_support;

pub use candidate::{Candidate, MatchResult, RawPlace};
pub use category::Category;
pub use distance::{EARTH_RADIUS, bounding_box, distance};
pub use fanout::{
    CandidateBatch, CategoryFailure, CategoryOutcome, FanOutOptions, RetryPolicy,
    query_candidates,
};
pub use geo_point::{GeoPoint, GeoPointError};
pub use matcher::{ProximityMatcher, SearchError, SearchOutcome, match_candidates};
pub use memory::MemoryPlaceProvider;
pub use pipeline::{
    NearbyPlace, RankedMatches, dedupe_and_sort, filter_by_category, measure, project,
    within_radius,
};
pub use provider::{GeocodeError, Geocoder, PlaceProvider, ProviderError};
pub use query::{DEFAULT_SEARCH_RADIUS, SEARCH_RADIUS_BOUNDS, SearchQuery, SearchQueryError};
pub use session::{SearchSession, SessionOutcome, SessionSnapshot};
pub use units::Meters;
