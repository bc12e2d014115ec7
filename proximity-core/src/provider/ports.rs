//! Provider traits for nearby search and address resolution.

use async_trait::async_trait;

use crate::{Category, GeoPoint, Meters, RawPlace};

use super::error::{GeocodeError, ProviderError};

/// Nearby search against an external point-of-interest service.
///
/// One call covers a single category. Implementations may return places
/// slightly outside `radius`; the matcher applies the exact radius itself.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use proximity_core::{Category, GeoPoint, Meters, PlaceProvider, ProviderError, RawPlace};
///
/// struct EmptyProvider;
///
/// #[async_trait]
/// impl PlaceProvider for EmptyProvider {
///     async fn nearby(
///         &self,
///         _origin: &GeoPoint,
///         _radius: Meters,
///         _category: Category,
///     ) -> Result<Vec<RawPlace>, ProviderError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Return places tagged with `category` around `origin`.
    async fn nearby(
        &self,
        origin: &GeoPoint,
        radius: Meters,
        category: Category,
    ) -> Result<Vec<RawPlace>, ProviderError>;
}

/// Resolve free-text addresses into coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Return the coordinates of `address`.
    ///
    /// Implementations must return `Err(GeocodeError::EmptyAddress)` when
    /// `address` is blank.
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError>;
}

#[async_trait]
impl<T: PlaceProvider + ?Sized> PlaceProvider for std::sync::Arc<T> {
    async fn nearby(
        &self,
        origin: &GeoPoint,
        radius: Meters,
        category: Category,
    ) -> Result<Vec<RawPlace>, ProviderError> {
        (**self).nearby(origin, radius, category).await
    }
}
