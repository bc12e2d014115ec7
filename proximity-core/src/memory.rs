//! In-process `PlaceProvider` over a fixed set of places.

use async_trait::async_trait;
use geo::{Coord, Intersects};

use crate::{
    Category, GeoPoint, Meters, PlaceProvider, ProviderError, RawPlace, distance::bounding_box,
};

/// `PlaceProvider` answering from places held in memory.
///
/// A query returns every place tagged with the requested category whose
/// location falls inside the bounding box of the search circle. The box is a
/// superset of the circle; the matcher applies the exact radius afterwards,
/// as it does for remote providers.
///
/// The store performs a linear scan and is intended for small datasets.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlaceProvider {
    places: Vec<RawPlace>,
}

impl MemoryPlaceProvider {
    /// Create a provider from a collection of places.
    pub fn with_places<I>(places: I) -> Self
    where
        I: IntoIterator<Item = RawPlace>,
    {
        Self {
            places: places.into_iter().collect(),
        }
    }

    /// Number of places held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Whether the provider holds no places.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

#[async_trait]
impl PlaceProvider for MemoryPlaceProvider {
    async fn nearby(
        &self,
        origin: &GeoPoint,
        radius: Meters,
        category: Category,
    ) -> Result<Vec<RawPlace>, ProviderError> {
        let bbox = bounding_box(origin, radius);
        let tag = category.as_str();
        Ok(self
            .places
            .iter()
            .filter(|place| place.tags.iter().any(|t| t == tag))
            // `Intersects` treats boundary points as inside the rectangle.
            .filter(|place| bbox.intersects(&Coord::from(place.location)))
            .cloned()
            .collect())
    }
}
