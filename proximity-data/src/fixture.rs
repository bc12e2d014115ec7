//! Offline `PlaceProvider` backed by a recorded nearby-search response.
//!
//! A fixture file has the same shape as a nearby-search response body:
//!
//! ```json
//! {
//!   "status": "OK",
//!   "results": [
//!     {
//!       "place_id": "school-1",
//!       "name": "Raffles Institution",
//!       "geometry": { "location": { "lat": 1.3472, "lng": 103.8454 } },
//!       "types": ["school"]
//!     }
//!   ]
//! }
//! ```
//!
//! Every place in the file is available to every query; each query returns
//! the places tagged with the requested category inside the search area.

use std::io::{self, BufReader};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use log::debug;
use proximity_core::{
    Category, GeoPoint, MemoryPlaceProvider, Meters, PlaceProvider, ProviderError, RawPlace,
};
use thiserror::Error;

use crate::maps::response::NearbySearchResponse;

/// Errors raised while loading a fixture file.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The file could not be opened.
    #[error("failed to open fixture {path}: {source}")]
    Io {
        /// Fixture path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file was not a valid nearby-search document.
    #[error("failed to parse fixture {path}: {source}")]
    Parse {
        /// Fixture path.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}

/// [`PlaceProvider`] answering from a fixture file loaded at start-up.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    places: MemoryPlaceProvider,
}

impl FixtureProvider {
    /// Load places from the fixture at `path`.
    ///
    /// Places with out-of-range coordinates are skipped with a warning. The
    /// document's `status` is not checked; a recorded error response simply
    /// yields no places.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Io`] if the file cannot be opened and
    /// [`FixtureError::Parse`] if it is not valid JSON of the expected shape.
    pub fn from_path(path: &Utf8Path) -> Result<Self, FixtureError> {
        let file =
            fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
                FixtureError::Io {
                    path: path.to_owned(),
                    source,
                }
            })?;
        let response: NearbySearchResponse = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| FixtureError::Parse {
                path: path.to_owned(),
                source,
            })?;
        let provider = Self::from_places(response.into_raw_places());
        debug!("loaded {} places from {path}", provider.len());
        Ok(provider)
    }

    /// Build a provider from places already in memory.
    pub fn from_places<I>(places: I) -> Self
    where
        I: IntoIterator<Item = RawPlace>,
    {
        Self {
            places: MemoryPlaceProvider::with_places(places),
        }
    }

    /// Number of places loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Whether no places were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

#[async_trait]
impl PlaceProvider for FixtureProvider {
    async fn nearby(
        &self,
        origin: &GeoPoint,
        radius: Meters,
        category: Category,
    ) -> Result<Vec<RawPlace>, ProviderError> {
        self.places.nearby(origin, radius, category).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fixture_path(name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    #[rstest]
    fn loads_valid_places() {
        let provider =
            FixtureProvider::from_path(&fixture_path("singapore.json")).expect("fixture loads");
        // One record has an out-of-range latitude and is skipped.
        assert_eq!(provider.len(), 6);
    }

    #[rstest]
    fn missing_file_is_an_io_error() {
        let err = FixtureProvider::from_path(&fixture_path("missing.json"))
            .expect_err("missing file");
        assert!(matches!(err, FixtureError::Io { .. }));
    }

    #[rstest]
    fn malformed_file_is_a_parse_error() {
        let err = FixtureProvider::from_path(&fixture_path("malformed.json"))
            .expect_err("malformed file");
        assert!(matches!(err, FixtureError::Parse { .. }));
        assert!(err.to_string().contains("malformed.json"));
    }

    #[rstest]
    #[tokio::test]
    async fn answers_by_category() {
        let provider =
            FixtureProvider::from_path(&fixture_path("singapore.json")).expect("fixture loads");
        let origin = GeoPoint::new(1.3, 103.8).expect("valid origin");
        let schools = provider
            .nearby(&origin, Meters::new(1000.0), Category::School)
            .await
            .expect("fixture provider never fails");
        let ids: Vec<_> = schools.into_iter().map(|p| p.place_id).collect();
        assert_eq!(ids, vec!["school-near", "shared-campus"]);
    }
}
