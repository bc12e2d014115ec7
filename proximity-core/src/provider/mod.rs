//! Ports for the external point-of-interest and geocoding services.
//!
//! [`PlaceProvider`] answers one nearby-search per category and
//! [`Geocoder`] resolves a free-text address into a [`GeoPoint`](crate::GeoPoint).
//! Both are async and object safe so adapters can be injected at the
//! composition root.
//!
//! Failures are typed: [`ProviderError`] for a single nearby-search call and
//! [`GeocodeError`] for address resolution.

mod error;
mod ports;

pub use error::{GeocodeError, ProviderError};
pub use ports::{Geocoder, PlaceProvider};
