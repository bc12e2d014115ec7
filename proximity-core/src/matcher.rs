//! End-to-end proximity search over a [`PlaceProvider`].

use std::collections::BTreeSet;

use log::debug;
use thiserror::Error;

use crate::{
    Candidate, Category, CategoryFailure, FanOutOptions, GeocodeError, Geocoder, Meters,
    NearbyPlace, PlaceProvider, RankedMatches, SearchQuery, SearchQueryError, dedupe_and_sort,
    fanout::query_candidates, filter_by_category, measure, project, within_radius,
};

/// Places found by a search, plus the categories whose provider call failed.
///
/// A non-empty `failures` list means `places` may be incomplete.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchOutcome {
    /// Nearest places first, truncated to the requested limit.
    pub places: Vec<NearbyPlace>,
    /// Categories that contributed nothing because their call failed.
    pub failures: Vec<CategoryFailure>,
}

/// Errors that abort a search outright.
///
/// Provider failures are not among them; they are reported per category in
/// [`SearchOutcome::failures`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// The address could not be resolved to an origin.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    /// The query parameters were rejected.
    #[error(transparent)]
    Query(#[from] SearchQueryError),
}

/// Rank fetched candidates against `query`.
///
/// Applies the category filter, distance annotation, radius selection and
/// deduplication in that order. Pure; no provider is involved.
#[must_use]
pub fn match_candidates<I>(query: &SearchQuery, candidates: I) -> RankedMatches
where
    I: IntoIterator<Item = Candidate>,
{
    let selected = filter_by_category(candidates, query.categories());
    let measured = measure(&query.origin(), selected);
    dedupe_and_sort(within_radius(measured, query.radius()))
}

/// Finds amenities near an origin using an injected provider.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use proximity_core::{Category, GeoPoint, MemoryPlaceProvider, Meters, ProximityMatcher, SearchQuery};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let matcher = ProximityMatcher::new(MemoryPlaceProvider::default());
/// let query = SearchQuery::new(
///     GeoPoint::new(1.3, 103.8)?,
///     BTreeSet::from([Category::School]),
///     Meters::new(1000.0),
/// )?;
/// let outcome = matcher.find_nearby(&query, Some(10)).await;
/// assert!(outcome.places.is_empty());
/// assert!(outcome.failures.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProximityMatcher<P> {
    provider: P,
    options: FanOutOptions,
}

impl<P> ProximityMatcher<P>
where
    P: PlaceProvider,
{
    /// Create a matcher with default fan-out options.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            options: FanOutOptions::default(),
        }
    }

    /// Replace the fan-out options.
    #[must_use]
    pub fn with_options(mut self, options: FanOutOptions) -> Self {
        self.options = options;
        self
    }

    /// Provider used for nearby searches.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Current fan-out options.
    pub fn options(&self) -> &FanOutOptions {
        &self.options
    }

    /// Search around `query.origin()`, returning at most `limit` places.
    ///
    /// Never fails: categories whose provider call fails are listed in
    /// [`SearchOutcome::failures`] and contribute no places.
    pub async fn find_nearby(&self, query: &SearchQuery, limit: Option<usize>) -> SearchOutcome {
        let batch = query_candidates(&self.provider, query, &self.options).await;
        let failures: Vec<_> = batch.failures().collect();
        let fetched = batch.candidates.len();
        let ranked = match_candidates(query, batch.candidates);
        debug!(
            "{fetched} candidates fetched, {} within {} of the origin",
            ranked.len(),
            query.radius()
        );
        SearchOutcome {
            places: project(ranked, limit),
            failures,
        }
    }

    /// Geocode `address` and search around the resulting point.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Geocode`] when the address cannot be resolved
    /// and [`SearchError::Query`] when `radius` is not a positive distance.
    pub async fn find_nearby_address<G>(
        &self,
        geocoder: &G,
        address: &str,
        categories: BTreeSet<Category>,
        radius: Meters,
        limit: Option<usize>,
    ) -> Result<SearchOutcome, SearchError>
    where
        G: Geocoder + ?Sized,
    {
        let origin = geocoder.geocode(address).await?;
        debug!("geocoded {address:?} to {origin}");
        let query = SearchQuery::new(origin, categories, radius)?;
        Ok(self.find_nearby(&query, limit).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    use crate::test_support::{StubGeocoder, StubPlaceProvider, north_of, raw_place};
    use crate::{GeoPoint, ProviderError};

    #[fixture]
    fn origin() -> GeoPoint {
        GeoPoint::new(1.3, 103.8).expect("valid origin")
    }

    fn at(origin: &GeoPoint, id: &str, category: Category, metres: f64) -> crate::RawPlace {
        let (lat, lon) = north_of(origin, metres);
        raw_place(id, category, lat, lon)
    }

    #[rstest]
    #[tokio::test]
    async fn ranks_and_limits(origin: GeoPoint) {
        let provider = StubPlaceProvider::new().with_places(
            Category::Cafe,
            vec![
                at(&origin, "far", Category::Cafe, 800.0),
                at(&origin, "near", Category::Cafe, 100.0),
                at(&origin, "mid", Category::Cafe, 400.0),
                at(&origin, "out", Category::Cafe, 5000.0),
            ],
        );
        let matcher = ProximityMatcher::new(provider);
        let query = SearchQuery::new(origin, BTreeSet::from([Category::Cafe]), Meters::new(1000.0))
            .expect("valid query");

        let outcome = matcher.find_nearby(&query, Some(2)).await;
        let ids: Vec<_> = outcome.places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
        assert!(outcome.failures.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn reports_failed_categories(origin: GeoPoint) {
        let provider = StubPlaceProvider::new()
            .with_places(Category::School, vec![at(&origin, "s", Category::School, 300.0)])
            .with_error(
                Category::Hospital,
                ProviderError::Unavailable {
                    message: "down".into(),
                },
            );
        let matcher = ProximityMatcher::new(provider);
        let query = SearchQuery::new(
            origin,
            BTreeSet::from([Category::School, Category::Hospital]),
            Meters::new(1000.0),
        )
        .expect("valid query");

        let outcome = matcher.find_nearby(&query, None).await;
        assert_eq!(outcome.places.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].category, Category::Hospital);
    }

    #[rstest]
    #[tokio::test]
    async fn address_search_uses_geocoded_origin(origin: GeoPoint) {
        let provider = StubPlaceProvider::new()
            .with_places(Category::Park, vec![at(&origin, "p", Category::Park, 250.0)]);
        let geocoder = StubGeocoder::default().with_address("1 Orchard Road", origin);
        let matcher = ProximityMatcher::new(provider);

        let outcome = matcher
            .find_nearby_address(
                &geocoder,
                "1 Orchard Road",
                BTreeSet::from([Category::Park]),
                Meters::new(1000.0),
                None,
            )
            .await
            .expect("address resolves");
        assert_eq!(outcome.places[0].distance_label, "250 m");
    }

    #[rstest]
    #[case("", SearchError::Geocode(GeocodeError::EmptyAddress))]
    #[case(
        "Nowhere",
        SearchError::Geocode(GeocodeError::NotFound { address: "Nowhere".into() })
    )]
    #[tokio::test]
    async fn geocode_failures_abort(#[case] address: &str, #[case] expected: SearchError) {
        let provider = StubPlaceProvider::new();
        let matcher = ProximityMatcher::new(provider);
        let err = matcher
            .find_nearby_address(
                &StubGeocoder::default(),
                address,
                BTreeSet::from([Category::Park]),
                Meters::new(1000.0),
                None,
            )
            .await
            .expect_err("geocoding should fail");
        assert_eq!(err, expected);
        assert_eq!(matcher.provider().calls(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_radius_aborts(origin: GeoPoint) {
        let geocoder = StubGeocoder::default().with_address("home", origin);
        let matcher = ProximityMatcher::new(StubPlaceProvider::new());
        let err = matcher
            .find_nearby_address(&geocoder, "home", BTreeSet::new(), Meters::ZERO, None)
            .await
            .expect_err("zero radius is rejected");
        assert!(matches!(err, SearchError::Query(_)));
    }
}
