//! Point-of-interest categories a user can filter on.
//!
//! Each category maps onto the place-type tag the provider uses in its
//! nearby-search API. The derived [`Ord`] follows declaration order, which is
//! also the order categories are fanned out in.
//!
//! # Examples
//! ```
//! use proximity_core::Category;
//!
//! assert_eq!(Category::ShoppingMall.as_str(), "shopping_mall");
//! assert_eq!("Bus Station".parse::<Category>(), Ok(Category::BusStation));
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point-of-interest category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Category {
    /// Schools of any level.
    School,
    /// Hospitals and clinics.
    Hospital,
    /// Grocery supermarkets.
    Supermarket,
    /// Restaurants.
    Restaurant,
    /// Cafes and coffee shops.
    Cafe,
    /// Bank branches.
    Bank,
    /// Cash machines.
    Atm,
    /// Shopping malls.
    ShoppingMall,
    /// Bus stations and interchanges.
    BusStation,
    /// Metro and subway stations.
    SubwayStation,
    /// Rail stations.
    TrainStation,
    /// Gyms and fitness centres.
    Gym,
    /// Pharmacies.
    Pharmacy,
    /// Parks and green spaces.
    Park,
    /// Public libraries.
    Library,
}

impl Category {
    /// Every category, in fan-out order.
    pub const ALL: [Self; 15] = [
        Self::School,
        Self::Hospital,
        Self::Supermarket,
        Self::Restaurant,
        Self::Cafe,
        Self::Bank,
        Self::Atm,
        Self::ShoppingMall,
        Self::BusStation,
        Self::SubwayStation,
        Self::TrainStation,
        Self::Gym,
        Self::Pharmacy,
        Self::Park,
        Self::Library,
    ];

    /// Return the provider tag for this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::School => "school",
            Self::Hospital => "hospital",
            Self::Supermarket => "supermarket",
            Self::Restaurant => "restaurant",
            Self::Cafe => "cafe",
            Self::Bank => "bank",
            Self::Atm => "atm",
            Self::ShoppingMall => "shopping_mall",
            Self::BusStation => "bus_station",
            Self::SubwayStation => "subway_station",
            Self::TrainStation => "train_station",
            Self::Gym => "gym",
            Self::Pharmacy => "pharmacy",
            Self::Park => "park",
            Self::Library => "library",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalised)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}
