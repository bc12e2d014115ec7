//! Scripted provider doubles used by unit and behaviour tests.
//!
//! [`StubPlaceProvider`] returns pre-configured places or errors per category
//! and can delay responses to exercise timeouts and superseded searches.
//! [`StubGeocoder`] resolves a fixed table of addresses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    Category, GeoPoint, GeocodeError, Geocoder, Meters, PlaceProvider, ProviderError, RawPlace,
};

#[derive(Debug, Clone)]
enum StubResponse {
    Places(Vec<RawPlace>),
    Error(ProviderError),
}

/// Stub `PlaceProvider` for tests.
///
/// Categories without a scripted response resolve to an empty list.
///
/// # Example
///
/// ```
/// use proximity_core::test_support::StubPlaceProvider;
/// use proximity_core::{Category, ProviderError};
///
/// let provider = StubPlaceProvider::new()
///     .with_places(Category::School, Vec::new())
///     .with_error(Category::Hospital, ProviderError::Timeout { timeout_ms: 10 });
/// assert_eq!(provider.calls(), 0);
/// ```
#[derive(Debug, Default)]
pub struct StubPlaceProvider {
    responses: HashMap<Category, StubResponse>,
    category_delays: HashMap<Category, Duration>,
    radius_delays: Vec<(Meters, Duration)>,
    failures_before_success: HashMap<Category, usize>,
    calls: AtomicUsize,
    calls_by_category: std::sync::Mutex<HashMap<Category, usize>>,
}

impl StubPlaceProvider {
    /// Create a provider with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `places` for `category`.
    #[must_use]
    pub fn with_places(mut self, category: Category, places: Vec<RawPlace>) -> Self {
        self.responses
            .insert(category, StubResponse::Places(places));
        self
    }

    /// Fail every call for `category` with `error`.
    #[must_use]
    pub fn with_error(mut self, category: Category, error: ProviderError) -> Self {
        self.responses.insert(category, StubResponse::Error(error));
        self
    }

    /// Fail the first `failures` calls for `category` with a network error,
    /// then answer with its scripted response.
    #[must_use]
    pub fn with_transient_failures(mut self, category: Category, failures: usize) -> Self {
        self.failures_before_success.insert(category, failures);
        self
    }

    /// Sleep for `delay` before answering calls for `category`.
    #[must_use]
    pub fn with_delay(mut self, category: Category, delay: Duration) -> Self {
        self.category_delays.insert(category, delay);
        self
    }

    /// Sleep for `delay` before answering calls made with `radius`.
    #[must_use]
    pub fn with_radius_delay(mut self, radius: Meters, delay: Duration) -> Self {
        self.radius_delays.push((radius, delay));
        self
    }

    /// Total number of `nearby` calls received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `nearby` calls received for `category`.
    #[must_use]
    pub fn calls_for(&self, category: Category) -> usize {
        self.calls_by_category
            .lock()
            .map(|counts| counts.get(&category).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    fn delay_for(&self, radius: Meters, category: Category) -> Duration {
        let by_category = self
            .category_delays
            .get(&category)
            .copied()
            .unwrap_or_default();
        let by_radius = self
            .radius_delays
            .iter()
            .filter(|(r, _)| *r == radius)
            .map(|(_, d)| *d)
            .max()
            .unwrap_or_default();
        by_category.max(by_radius)
    }

    fn record_call(&self, category: Category) -> usize {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut counts = match self.calls_by_category.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let count = counts.entry(category).or_default();
        *count += 1;
        *count
    }
}

#[async_trait]
impl PlaceProvider for StubPlaceProvider {
    async fn nearby(
        &self,
        _origin: &GeoPoint,
        radius: Meters,
        category: Category,
    ) -> Result<Vec<RawPlace>, ProviderError> {
        let attempt = self.record_call(category);

        let delay = self.delay_for(radius, category);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failures = self
            .failures_before_success
            .get(&category)
            .copied()
            .unwrap_or_default();
        if attempt <= failures {
            return Err(ProviderError::Network {
                url: format!("stub://nearby/{category}"),
                message: format!("scripted failure {attempt} of {failures}"),
            });
        }

        match self.responses.get(&category) {
            Some(StubResponse::Places(places)) => Ok(places.clone()),
            Some(StubResponse::Error(error)) => Err(error.clone()),
            None => Ok(Vec::new()),
        }
    }
}

/// Stub `Geocoder` resolving a fixed table of addresses.
#[derive(Debug, Clone, Default)]
pub struct StubGeocoder {
    addresses: HashMap<String, GeoPoint>,
    failure: Option<GeocodeError>,
}

impl StubGeocoder {
    /// Resolve `address` to `location`.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>, location: GeoPoint) -> Self {
        self.addresses.insert(address.into(), location);
        self
    }

    /// Fail every non-blank lookup with `error`.
    #[must_use]
    pub fn with_error(mut self, error: GeocodeError) -> Self {
        self.failure = Some(error);
        self
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.addresses
            .get(trimmed)
            .copied()
            .ok_or_else(|| GeocodeError::NotFound {
                address: trimmed.to_owned(),
            })
    }
}

/// Build a raw place tagged with `category` at the given coordinates.
///
/// # Panics
///
/// Panics if the coordinates are out of range; test inputs are expected to
/// be valid.
#[must_use]
pub fn raw_place(id: &str, category: Category, latitude: f64, longitude: f64) -> RawPlace {
    let location = GeoPoint::new(latitude, longitude)
        .unwrap_or_else(|err| panic!("invalid test coordinate for {id}: {err}"));
    RawPlace {
        place_id: id.to_owned(),
        name: format!("{id} ({category})"),
        location,
        tags: vec![category.as_str().to_owned()],
        rating: None,
    }
}

/// Offset `origin` due north by `metres`, returning `(latitude, longitude)`.
#[must_use]
pub fn north_of(origin: &GeoPoint, metres: f64) -> (f64, f64) {
    let degrees = (metres / crate::distance::EARTH_RADIUS.get()).to_degrees();
    (origin.latitude() + degrees, origin.longitude())
}
