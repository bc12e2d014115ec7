//! Great-circle distance between coordinates.
//!
//! Distances are computed with the haversine formula on a sphere of radius
//! [`EARTH_RADIUS`] and always returned as [`Meters`].

use geo::{Coord, Rect};

use crate::{GeoPoint, Meters};

/// Mean Earth radius used by [`distance`].
pub const EARTH_RADIUS: Meters = Meters::new(6_371_000.0);

/// Haversine distance between `a` and `b`.
///
/// The result is symmetric and zero for identical points. Inputs are assumed
/// valid; [`GeoPoint::new`] enforces coordinate ranges.
///
/// # Examples
/// ```
/// use proximity_core::{distance, GeoPoint};
///
/// # fn main() -> Result<(), proximity_core::GeoPointError> {
/// let a = GeoPoint::new(0.0, 0.0)?;
/// let b = GeoPoint::new(0.0, 1.0)?;
/// let d = distance(&a, &b);
/// assert!((d.get() - 111_194.9).abs() < 1.0);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> Meters {
    let lat_a = a.latitude().to_radians();
    let lat_b = b.latitude().to_radians();
    let delta_lat = (b.latitude() - a.latitude()).to_radians();
    let delta_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `h` fractionally above one for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    Meters::new(EARTH_RADIUS.get() * central_angle)
}

/// Axis-aligned box (`x = longitude`, `y = latitude`) enclosing every point
/// within `radius` of `origin`.
///
/// This is a coarse prefilter: points inside the box still need an exact
/// [`distance`] check. Boxes reaching a pole or crossing the antimeridian
/// widen to the full longitude range.
#[must_use]
pub fn bounding_box(origin: &GeoPoint, radius: Meters) -> Rect<f64> {
    let angular = (radius.get() / EARTH_RADIUS.get()).to_degrees();
    let min_lat = origin.latitude() - angular;
    let max_lat = origin.latitude() + angular;

    let (min_lon, max_lon) = if min_lat <= -90.0 || max_lat >= 90.0 {
        (-180.0, 180.0)
    } else {
        let lon_delta = angular / origin.latitude().to_radians().cos();
        let west = origin.longitude() - lon_delta;
        let east = origin.longitude() + lon_delta;
        if west < -180.0 || east > 180.0 {
            (-180.0, 180.0)
        } else {
            (west, east)
        }
    };

    Rect::new(
        Coord {
            x: min_lon,
            y: min_lat.max(-90.0),
        },
        Coord {
            x: max_lon,
            y: max_lat.min(90.0),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Intersects;
    use rstest::rstest;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).expect("valid test coordinate")
    }

    #[rstest]
    fn identical_points_are_zero_apart() {
        let p = point(1.3, 103.8);
        assert_eq!(distance(&p, &p), Meters::ZERO);
    }

    #[rstest]
    #[case(point(51.5074, -0.1278), point(48.8566, 2.3522), 343_556.0)]
    #[case(point(1.3, 103.8), point(1.3027, 103.8), 300.2)]
    #[case(point(0.0, 0.0), point(0.0, 180.0), 20_015_086.8)]
    fn matches_known_distances(#[case] a: GeoPoint, #[case] b: GeoPoint, #[case] expected: f64) {
        let d = distance(&a, &b).get();
        let tolerance = expected * 0.001;
        assert!(
            (d - expected).abs() <= tolerance,
            "expected {expected} m, got {d} m"
        );
    }

    #[rstest]
    fn distance_is_symmetric() {
        let a = point(-33.86, 151.21);
        let b = point(35.68, 139.69);
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[rstest]
    fn bounding_box_contains_points_on_the_radius() {
        let origin = point(1.3, 103.8);
        let radius = Meters::new(1000.0);
        let rect = bounding_box(&origin, radius);
        // ~1000 m due north and due east of the origin.
        let north = point(1.3 + 0.00898, 103.8);
        let east = point(1.3, 103.8 + 0.00898);
        assert!(rect.intersects(&Coord::from(north)));
        assert!(rect.intersects(&Coord::from(east)));
        assert!(!rect.intersects(&Coord::from(point(1.32, 103.8))));
    }

    #[rstest]
    fn bounding_box_near_pole_spans_all_longitudes() {
        let rect = bounding_box(&point(89.99, 10.0), Meters::new(5000.0));
        assert_eq!(rect.min().x, -180.0);
        assert_eq!(rect.max().x, 180.0);
        assert_eq!(rect.max().y, 90.0);
    }

    #[rstest]
    fn bounding_box_across_antimeridian_spans_all_longitudes() {
        let rect = bounding_box(&point(0.0, 179.999), Meters::new(1000.0));
        assert_eq!(rect.min().x, -180.0);
        assert_eq!(rect.max().x, 180.0);
    }
}
