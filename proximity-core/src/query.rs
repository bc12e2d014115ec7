//! Search requests built from the user's filter selection.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use thiserror::Error;

use crate::{Category, GeoPoint, Meters};

/// Radius applied when the caller does not choose one.
pub const DEFAULT_SEARCH_RADIUS: Meters = Meters::new(1000.0);

/// Radii offered by the adjustable search flow, in metres.
pub const SEARCH_RADIUS_BOUNDS: RangeInclusive<f64> = 500.0..=10_000.0;

/// A proximity search around an origin.
///
/// Categories are held in a [`BTreeSet`], so iteration (and therefore the
/// provider fan-out order) is deterministic.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use proximity_core::{Category, GeoPoint, Meters, SearchQuery};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let query = SearchQuery::new(
///     GeoPoint::new(1.3, 103.8)?,
///     BTreeSet::from([Category::School, Category::Park]),
///     Meters::new(1000.0),
/// )?;
/// assert_eq!(query.categories().len(), 2);
/// assert!(SearchQuery::new(query.origin(), BTreeSet::new(), Meters::ZERO).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    origin: GeoPoint,
    categories: BTreeSet<Category>,
    radius: Meters,
}

/// Errors returned by [`SearchQuery::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SearchQueryError {
    /// The radius was zero, negative or not finite.
    #[error("search radius must be a positive number of metres, got {0}")]
    InvalidRadius(f64),
}

impl SearchQuery {
    /// Validates and constructs a [`SearchQuery`].
    pub fn new(
        origin: GeoPoint,
        categories: BTreeSet<Category>,
        radius: Meters,
    ) -> Result<Self, SearchQueryError> {
        let value = radius.get();
        if !value.is_finite() || value <= 0.0 {
            return Err(SearchQueryError::InvalidRadius(value));
        }
        Ok(Self {
            origin,
            categories,
            radius,
        })
    }

    /// Centre of the search.
    #[must_use]
    pub const fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Selected categories.
    #[must_use]
    pub const fn categories(&self) -> &BTreeSet<Category> {
        &self.categories
    }

    /// Maximum distance from the origin.
    #[must_use]
    pub const fn radius(&self) -> Meters {
        self.radius
    }
}
