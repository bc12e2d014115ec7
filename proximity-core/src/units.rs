//! Distance unit shared by every stage of the matcher.
//!
//! All distances and radii are carried as [`Meters`]. Kilometre values only
//! enter through [`Meters::from_kilometres`], so a call site cannot compare a
//! kilometre distance against a metre radius by accident.

use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const METRES_PER_KILOMETRE: f64 = 1000.0;

/// A distance in metres.
///
/// # Examples
/// ```
/// use proximity_core::Meters;
///
/// let radius = Meters::from_kilometres(1.5);
/// assert_eq!(radius, Meters::new(1500.0));
/// assert_eq!(radius.to_string(), "1.5 km");
/// assert_eq!(Meters::new(320.4).to_string(), "320 m");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Meters(f64);

impl Meters {
    /// Zero distance.
    pub const ZERO: Self = Self(0.0);

    /// Wrap a value already expressed in metres.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Convert a kilometre value into metres.
    #[must_use]
    pub fn from_kilometres(kilometres: f64) -> Self {
        Self(kilometres * METRES_PER_KILOMETRE)
    }

    /// Raw value in metres.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Value in kilometres.
    #[must_use]
    pub fn as_kilometres(self) -> f64 {
        self.0 / METRES_PER_KILOMETRE
    }

    /// Whether this distance lies inside (or on) `radius`.
    #[must_use]
    pub fn is_within(self, radius: Self) -> bool {
        self.0 <= radius.0
    }

    /// Total ordering over metre values, NaN sorting last.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < METRES_PER_KILOMETRE {
            write!(f, "{:.0} m", self.0)
        } else {
            write!(f, "{:.1} km", self.as_kilometres())
        }
    }
}
