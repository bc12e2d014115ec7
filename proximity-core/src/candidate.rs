use crate::{Category, GeoPoint, Meters};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A place exactly as a provider reported it.
///
/// Providers may tag one place with several categories; `tags` keeps them
/// all. [`Candidate::from_raw`] narrows a raw place to the category it was
/// queried under.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawPlace {
    /// Stable provider-assigned identifier.
    pub place_id: String,
    /// Display name.
    pub name: String,
    /// Reported position.
    pub location: GeoPoint,
    /// Provider category tags, e.g. `["school", "point_of_interest"]`.
    pub tags: Vec<String>,
    /// Average user rating, when the provider has one.
    pub rating: Option<f32>,
}

/// A point of interest considered for a single search.
///
/// # Examples
/// ```
/// use proximity_core::{Candidate, Category, GeoPoint, RawPlace};
///
/// # fn main() -> Result<(), proximity_core::GeoPointError> {
/// let raw = RawPlace {
///     place_id: "abc".into(),
///     name: "Nanyang Primary".into(),
///     location: GeoPoint::new(1.3, 103.8)?,
///     tags: vec!["school".into()],
///     rating: Some(4.5),
/// };
/// let candidate = Candidate::from_raw(raw, Category::School);
/// assert_eq!(candidate.id, "abc");
/// assert_eq!(candidate.category, Category::School);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    /// Stable provider-assigned identifier; the deduplication key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category the candidate was found under.
    pub category: Category,
    /// Position of the place.
    pub location: GeoPoint,
    /// Average user rating, if known.
    pub rating: Option<f32>,
}

impl Candidate {
    /// Adapt a provider place found by a query for `category`.
    #[must_use]
    pub fn from_raw(raw: RawPlace, category: Category) -> Self {
        Self {
            id: raw.place_id,
            name: raw.name,
            category,
            location: raw.location,
            rating: raw.rating,
        }
    }
}

/// A candidate annotated with its distance from the search origin.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchResult {
    /// The matched place.
    pub candidate: Candidate,
    /// Great-circle distance from the origin.
    pub distance: Meters,
}
