//! Property tests for the distance calculation and ranking pipeline.

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use proximity_core::test_support::{StubPlaceProvider, raw_place};
use proximity_core::{
    Candidate, Category, GeoPoint, Meters, ProximityMatcher, RawPlace, SearchQuery, distance,
    match_candidates, project,
};

fn geo_point() -> impl Strategy<Value = GeoPoint> {
    (-90.0_f64..=90.0, -180.0_f64..=180.0)
        .prop_map(|(lat, lon)| GeoPoint::new(lat, lon).expect("generated in range"))
}

fn category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

/// Candidates within roughly 5 km of (1.3, 103.8), with ids drawn from a
/// small pool so duplicates are common.
fn candidates() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec(
        (0_u8..12, category(), -0.045_f64..0.045, -0.045_f64..0.045),
        0..40,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(id, category, dlat, dlon)| Candidate {
                id: format!("place-{id}"),
                name: format!("Place {id}"),
                category,
                location: GeoPoint::new(1.3 + dlat, 103.8 + dlon).expect("generated in range"),
                rating: None,
            })
            .collect()
    })
}

/// Provider listings on a coarse grid around (1.3, 103.8). Mirrored grid
/// offsets give equal distances and the small id pool repeats ids across
/// categories.
fn listings() -> impl Strategy<Value = Vec<(Category, RawPlace)>> {
    let categories = vec![Category::School, Category::Hospital, Category::Park];
    prop::collection::vec(
        (0_u8..6, prop::sample::select(categories), -3_i8..=3, -3_i8..=3),
        0..24,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(id, category, north, east)| {
                let lat = 1.3 + f64::from(north) * 0.002;
                let lon = 103.8 + f64::from(east) * 0.002;
                (category, raw_place(&format!("place-{id}"), category, lat, lon))
            })
            .collect()
    })
}

fn query() -> impl Strategy<Value = SearchQuery> {
    (prop::collection::btree_set(category(), 0..5), 100.0_f64..5000.0).prop_map(
        |(categories, radius)| {
            SearchQuery::new(
                GeoPoint::new(1.3, 103.8).expect("valid origin"),
                categories,
                Meters::new(radius),
            )
            .expect("positive radius")
        },
    )
}

proptest! {
    #[test]
    fn distance_is_symmetric(a in geo_point(), b in geo_point()) {
        let ab = distance(&a, &b).get();
        let ba = distance(&b, &a).get();
        prop_assert!((ab - ba).abs() <= 1e-6);
    }

    #[test]
    fn distance_to_self_is_zero(a in geo_point()) {
        prop_assert_eq!(distance(&a, &a), Meters::ZERO);
    }

    #[test]
    fn distance_is_bounded_by_half_circumference(a in geo_point(), b in geo_point()) {
        let d = distance(&a, &b).get();
        prop_assert!(d >= 0.0);
        prop_assert!(d <= std::f64::consts::PI * 6_371_000.0 + 1e-6);
    }

    #[test]
    fn ranked_matches_respect_query(query in query(), candidates in candidates()) {
        let ranked = match_candidates(&query, candidates);
        let mut ids = HashSet::new();
        for m in ranked.as_slice() {
            prop_assert!(m.distance <= query.radius());
            prop_assert!(query.categories().contains(&m.candidate.category));
            prop_assert!(ids.insert(m.candidate.id.clone()), "duplicate id {}", m.candidate.id);
        }
        for pair in ranked.as_slice().windows(2) {
            let ordered = pair[0].distance < pair[1].distance
                || (pair[0].distance == pair[1].distance
                    && pair[0].candidate.id <= pair[1].candidate.id);
            prop_assert!(ordered);
        }
    }

    #[test]
    fn empty_selection_yields_nothing(candidates in candidates()) {
        let query = SearchQuery::new(
            GeoPoint::new(1.3, 103.8).expect("valid origin"),
            BTreeSet::new(),
            Meters::new(5000.0),
        )
        .expect("valid query");
        prop_assert!(match_candidates(&query, candidates).is_empty());
    }

    #[test]
    fn limit_keeps_the_nearest_prefix(
        query in query(),
        candidates in candidates(),
        limit in 0_usize..10,
    ) {
        let full = project(match_candidates(&query, candidates.clone()), None);
        let limited = project(match_candidates(&query, candidates), Some(limit));
        prop_assert_eq!(limited.len(), full.len().min(limit));
        prop_assert_eq!(&full[..limited.len()], &limited[..]);
    }

    #[test]
    fn ranking_is_idempotent(query in query(), candidates in candidates()) {
        let once = match_candidates(&query, candidates);
        let again = match_candidates(
            &query,
            once.as_slice().iter().map(|m| m.candidate.clone()),
        );
        prop_assert_eq!(once, again);
    }

    #[test]
    fn repeated_searches_rank_identically(listings in listings(), limit in prop::option::of(0_usize..10)) {
        let mut provider = StubPlaceProvider::new();
        for category in [Category::School, Category::Hospital, Category::Park] {
            let places = listings
                .iter()
                .filter(|(listed, _)| *listed == category)
                .map(|(_, place)| place.clone())
                .collect();
            provider = provider.with_places(category, places);
        }
        let matcher = ProximityMatcher::new(provider);
        let query = SearchQuery::new(
            GeoPoint::new(1.3, 103.8).expect("valid origin"),
            BTreeSet::from([Category::School, Category::Hospital, Category::Park]),
            Meters::new(1000.0),
        )
        .expect("valid query");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime should build");
        let first = runtime.block_on(matcher.find_nearby(&query, limit));
        let second = runtime.block_on(matcher.find_nearby(&query, limit));
        prop_assert!(first.failures.is_empty());
        prop_assert_eq!(first.places, second.places);
    }
}
