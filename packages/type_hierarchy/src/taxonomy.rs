//! The compiled-in place type taxonomy.
//!
//! Every concrete type string belongs to exactly one [`TypeCategory`]. Type
//! strings are lowercase `snake_case`, the same vocabulary datasources
//! advertise.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Top-level place type categories.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TypeCategory {
    /// Lakes, rivers and other bodies of water
    Water,
    /// Mountains, valleys and terrain features
    Landforms,
    /// Vegetation and protected natural areas
    Natural,
    /// Islands of any size
    Island,
    /// Administrative units
    Administrative,
    /// Populated places
    Settlement,
    /// Individual buildings and structures
    Building,
    /// Transport network features
    Transport,
    /// Public services and facilities
    Amenity,
    /// Utilities and industrial installations
    Infrastructure,
    /// Anything else with a name
    Other,
}

impl TypeCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Water,
            Self::Landforms,
            Self::Natural,
            Self::Island,
            Self::Administrative,
            Self::Settlement,
            Self::Building,
            Self::Transport,
            Self::Amenity,
            Self::Infrastructure,
            Self::Other,
        ]
    }

    /// Concrete types belonging to this category.
    #[must_use]
    pub const fn types(self) -> &'static [&'static str] {
        match self {
            Self::Water => &[
                "lake",
                "river",
                "pond",
                "spring",
                "stream",
                "waterfall",
                "sea",
            ],
            Self::Landforms => &[
                "mountain", "peak", "hill", "pass", "valley", "ridge", "cliff", "cave", "glacier",
            ],
            Self::Natural => &["forest", "nature_reserve", "wetland", "meadow", "rock"],
            Self::Island => &["island", "islet"],
            Self::Administrative => &["country", "canton", "district", "municipality", "region"],
            Self::Settlement => &[
                "city",
                "town",
                "village",
                "hamlet",
                "locality",
                "neighborhood",
            ],
            Self::Building => &["building", "castle", "church", "monastery", "tower", "ruin"],
            Self::Transport => &[
                "train_station",
                "bus_stop",
                "airport",
                "airfield",
                "port",
                "road",
                "railway",
                "bridge",
                "tunnel",
                "ferry_terminal",
            ],
            Self::Amenity => &[
                "hospital",
                "school",
                "university",
                "museum",
                "hotel",
                "restaurant",
                "sports_facility",
                "campground",
            ],
            Self::Infrastructure => &[
                "dam",
                "power_plant",
                "antenna",
                "wastewater_plant",
                "landfill",
            ],
            Self::Other => &["landmark", "place_name", "other"],
        }
    }
}
