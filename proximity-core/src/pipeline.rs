//! Pure stages applied to candidates once the provider fan-out has joined.
//!
//! The stages run in this order:
//!
//! 1. [`filter_by_category`] drops candidates outside the selection.
//! 2. [`measure`] annotates each candidate with its distance from the origin.
//! 3. [`within_radius`] keeps matches inside the search radius.
//! 4. [`dedupe_and_sort`] removes repeated places and orders by distance.
//! 5. [`project`] truncates the ranked list and shapes presentation records.
//!
//! [`project`] only accepts [`RankedMatches`], which only
//! [`dedupe_and_sort`] can produce, so truncation always happens after
//! sorting.

use std::collections::{BTreeSet, HashSet};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{Candidate, Category, GeoPoint, MatchResult, Meters, distance};

/// Keep candidates whose category is in `allowed`.
///
/// An empty selection yields no candidates, not every candidate.
pub fn filter_by_category<I>(candidates: I, allowed: &BTreeSet<Category>) -> Vec<Candidate>
where
    I: IntoIterator<Item = Candidate>,
{
    candidates
        .into_iter()
        .filter(|candidate| allowed.contains(&candidate.category))
        .collect()
}

/// Annotate each candidate with its distance from `origin`.
pub fn measure<I>(origin: &GeoPoint, candidates: I) -> Vec<MatchResult>
where
    I: IntoIterator<Item = Candidate>,
{
    candidates
        .into_iter()
        .map(|candidate| MatchResult {
            distance: distance(origin, &candidate.location),
            candidate,
        })
        .collect()
}

/// Keep matches whose distance is at most `radius`.
pub fn within_radius<I>(matches: I, radius: Meters) -> Vec<MatchResult>
where
    I: IntoIterator<Item = MatchResult>,
{
    matches
        .into_iter()
        .filter(|m| m.distance.is_within(radius))
        .collect()
}

/// Matches with unique ids, ordered nearest first.
///
/// Only [`dedupe_and_sort`] constructs this type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankedMatches(Vec<MatchResult>);

impl RankedMatches {
    /// Ranked matches as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[MatchResult] {
        &self.0
    }

    /// Number of ranked matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no match survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the wrapper, returning the ordered matches.
    #[must_use]
    pub fn into_vec(self) -> Vec<MatchResult> {
        self.0
    }
}

/// Remove duplicate places and order the remainder by distance.
///
/// The first occurrence of an id, in input order, is kept. The input order is
/// the fan-out order: categories in [`Category`] order, then provider order
/// within a category. Survivors are sorted by ascending distance with ties
/// broken by ascending id, so identical inputs always rank identically.
pub fn dedupe_and_sort<I>(matches: I) -> RankedMatches
where
    I: IntoIterator<Item = MatchResult>,
{
    let mut seen = HashSet::new();
    let mut unique: Vec<MatchResult> = matches
        .into_iter()
        .filter(|m| seen.insert(m.candidate.id.clone()))
        .collect();
    unique.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.candidate.id.cmp(&b.candidate.id))
    });
    RankedMatches(unique)
}

/// Presentation record for a nearby place.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NearbyPlace {
    /// Provider identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category the place matched.
    pub category: Category,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Average rating, if known.
    pub rating: Option<f32>,
    /// Distance from the origin.
    pub distance_meters: Meters,
    /// Human-readable distance, e.g. `"350 m"` or `"1.2 km"`.
    pub distance_label: String,
}

impl From<MatchResult> for NearbyPlace {
    fn from(m: MatchResult) -> Self {
        Self {
            latitude: m.candidate.location.latitude(),
            longitude: m.candidate.location.longitude(),
            id: m.candidate.id,
            name: m.candidate.name,
            category: m.candidate.category,
            rating: m.candidate.rating,
            distance_label: m.distance.to_string(),
            distance_meters: m.distance,
        }
    }
}

/// Shape ranked matches into presentation records, keeping at most `limit`.
///
/// `None` keeps every match.
#[must_use]
pub fn project(ranked: RankedMatches, limit: Option<usize>) -> Vec<NearbyPlace> {
    let take = limit.unwrap_or(usize::MAX);
    ranked
        .into_vec()
        .into_iter()
        .take(take)
        .map(NearbyPlace::from)
        .collect()
}
