#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial relation definition types.
//!
//! A spatial relation names a geometric transformation that turns a
//! reference geometry into a search area. Every relation belongs to exactly
//! one [`RelationCategory`], and the category decides which parameters the
//! relation carries. [`RelationKind`] encodes that as one variant per
//! category so a definition can never hold a parameter its category forbids.
//!
//! [`RelationSpec`] is the flat, serializable shape used by TOML catalogues.
//! Converting it into a [`RelationDefinition`] is where required and
//! forbidden fields are checked.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Angular width of every directional sector, in degrees.
pub const SECTOR_WIDTH_DEGREES: f64 = 90.0;

/// The family of geometric operation a relation applies.
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
#[strum(serialize_all = "snake_case")]
pub enum RelationCategory {
    /// The reference geometry itself, unchanged
    Containment,
    /// Everything within a distance of the reference
    Buffer,
    /// A buffer with the reference footprint removed
    Ring,
    /// The reference shrunk inward by a depth
    Erosion,
    /// An angular sector anchored at the reference centroid
    Directional,
}

impl RelationCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Containment,
            Self::Buffer,
            Self::Ring,
            Self::Erosion,
            Self::Directional,
        ]
    }
}

/// Where a buffer distance is measured from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BufferOrigin {
    /// Measured from the geometry's centroid
    Center,
    /// Measured from the geometry's boundary
    Edge,
}

/// One of the eight compass directions a directional relation points at.
///
/// Bearings are degrees clockwise from true north.
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
#[strum(serialize_all = "snake_case")]
pub enum CompassDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CompassDirection {
    /// Returns the bearing this direction is centred on.
    #[must_use]
    pub const fn bearing_degrees(self) -> f64 {
        match self {
            Self::North => 0.0,
            Self::Northeast => 45.0,
            Self::East => 90.0,
            Self::Southeast => 135.0,
            Self::South => 180.0,
            Self::Southwest => 225.0,
            Self::West => 270.0,
            Self::Northwest => 315.0,
        }
    }

    /// Maps a bearing back to its direction.
    ///
    /// Only the eight exact multiples of 45° in `[0, 360)` are accepted.
    #[must_use]
    pub fn from_bearing(bearing_degrees: f64) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|direction| (direction.bearing_degrees() - bearing_degrees).abs() < f64::EPSILON)
    }

    /// Returns all variants of this enum, clockwise from north.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::North,
            Self::Northeast,
            Self::East,
            Self::Southeast,
            Self::South,
            Self::Southwest,
            Self::West,
            Self::Northwest,
        ]
    }
}

/// Category-specific parameters of a relation.
///
/// Each variant carries exactly the defaults its category needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelationKind {
    /// Passthrough, no parameters.
    Containment,
    /// Symmetric buffer.
    Buffer {
        /// Default buffer distance in meters (> 0).
        distance_m: f64,
        /// Whether the buffer grows from the centroid or the boundary.
        buffer_from: BufferOrigin,
    },
    /// Buffer from the boundary minus the reference footprint.
    Ring {
        /// Default band width in meters (> 0).
        distance_m: f64,
    },
    /// Negative buffer.
    Erosion {
        /// Default shrink depth in meters (< 0).
        depth_m: f64,
    },
    /// 90° sector wedge around a compass bearing.
    Directional {
        /// Direction the sector is centred on.
        direction: CompassDirection,
        /// Default sector radius in meters (> 0).
        distance_m: f64,
    },
}

impl RelationKind {
    /// Returns the category this kind belongs to.
    #[must_use]
    pub const fn category(&self) -> RelationCategory {
        match self {
            Self::Containment => RelationCategory::Containment,
            Self::Buffer { .. } => RelationCategory::Buffer,
            Self::Ring { .. } => RelationCategory::Ring,
            Self::Erosion { .. } => RelationCategory::Erosion,
            Self::Directional { .. } => RelationCategory::Directional,
        }
    }

    /// Default distance for buffer, ring and directional relations.
    #[must_use]
    pub const fn default_distance_m(&self) -> Option<f64> {
        match self {
            Self::Buffer { distance_m, .. }
            | Self::Ring { distance_m }
            | Self::Directional { distance_m, .. } => Some(*distance_m),
            Self::Containment | Self::Erosion { .. } => None,
        }
    }

    /// Default depth for erosion relations.
    #[must_use]
    pub const fn default_depth_m(&self) -> Option<f64> {
        match self {
            Self::Erosion { depth_m } => Some(*depth_m),
            _ => None,
        }
    }

    /// Bearing of a directional relation.
    #[must_use]
    pub const fn bearing_degrees(&self) -> Option<f64> {
        match self {
            Self::Directional { direction, .. } => Some(direction.bearing_degrees()),
            _ => None,
        }
    }

    /// Sector width of a directional relation.
    #[must_use]
    pub const fn sector_width_degrees(&self) -> Option<f64> {
        match self {
            Self::Directional { .. } => Some(SECTOR_WIDTH_DEGREES),
            _ => None,
        }
    }

    /// Origin the relation's distance is measured from.
    ///
    /// Containment has no distance and therefore no origin.
    #[must_use]
    pub const fn buffer_from(&self) -> Option<BufferOrigin> {
        match self {
            Self::Containment => None,
            Self::Buffer { buffer_from, .. } => Some(*buffer_from),
            Self::Ring { .. } | Self::Erosion { .. } => Some(BufferOrigin::Edge),
            Self::Directional { .. } => Some(BufferOrigin::Center),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match *self {
            Self::Containment => Ok(()),
            Self::Buffer { distance_m, .. }
            | Self::Ring { distance_m }
            | Self::Directional { distance_m, .. } => {
                if distance_m.is_finite() && distance_m > 0.0 {
                    Ok(())
                } else {
                    Err(format!(
                        "default_distance_m must be a finite value > 0, got {distance_m}"
                    ))
                }
            }
            Self::Erosion { depth_m } => {
                if depth_m.is_finite() && depth_m < 0.0 {
                    Ok(())
                } else {
                    Err(format!(
                        "default_depth_m must be a finite value < 0, got {depth_m}"
                    ))
                }
            }
        }
    }
}

/// Error returned when a relation definition is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid relation definition '{name}': {reason}")]
pub struct InvalidRelationDefinition {
    /// Name of the offending relation.
    pub name: String,
    /// What is wrong with it.
    pub reason: String,
}

/// A named spatial relation and its default parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDefinition {
    name: String,
    description: String,
    applies_to: Vec<String>,
    kind: RelationKind,
}

impl RelationDefinition {
    /// Creates a definition with an empty description.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            applies_to: Vec::new(),
            kind,
        }
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the feature types this relation is commonly used with.
    #[must_use]
    pub fn with_applies_to<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applies_to = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Feature types this relation is commonly used with.
    #[must_use]
    pub fn applies_to(&self) -> &[String] {
        &self.applies_to
    }

    #[must_use]
    pub const fn kind(&self) -> &RelationKind {
        &self.kind
    }

    #[must_use]
    pub const fn category(&self) -> RelationCategory {
        self.kind.category()
    }

    /// Checks the name and the numeric defaults.
    ///
    /// Names must be lowercase snake-case identifiers. Distances must be
    /// finite and positive, depths finite and negative.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRelationDefinition`] describing the first problem found.
    pub fn validate(&self) -> Result<(), InvalidRelationDefinition> {
        if !is_snake_case(&self.name) {
            return Err(self.invalid(
                "name must be a lowercase snake_case identifier starting with a letter",
            ));
        }
        self.kind.validate().map_err(|reason| self.invalid(reason))
    }

    fn invalid(&self, reason: impl Into<String>) -> InvalidRelationDefinition {
        InvalidRelationDefinition {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }
}

fn is_snake_case(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Flat, serializable form of a relation as it appears in a TOML catalogue.
///
/// Every category-specific field is optional here; [`RelationDefinition`]'s
/// `TryFrom` impl decides which ones the category requires or forbids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationSpec {
    pub name: String,
    pub category: RelationCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_distance_m: Option<f64>,
    #[serde(default)]
    pub default_depth_m: Option<f64>,
    #[serde(default)]
    pub bearing_degrees: Option<f64>,
    #[serde(default)]
    pub sector_width_degrees: Option<f64>,
    #[serde(default)]
    pub buffer_from: Option<BufferOrigin>,
    #[serde(default)]
    pub applies_to: Vec<String>,
}

impl RelationSpec {
    fn invalid(&self, reason: impl Into<String>) -> InvalidRelationDefinition {
        InvalidRelationDefinition {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn forbid<T>(&self, field: &str, value: Option<T>) -> Result<(), InvalidRelationDefinition> {
        if value.is_some() {
            return Err(self.invalid(format!(
                "{field} is not allowed for {} relations",
                self.category
            )));
        }
        Ok(())
    }

    fn require<T>(&self, field: &str, value: Option<T>) -> Result<T, InvalidRelationDefinition> {
        value.ok_or_else(|| {
            self.invalid(format!(
                "{field} is required for {} relations",
                self.category
            ))
        })
    }

    fn expect_origin(&self, origin: BufferOrigin) -> Result<(), InvalidRelationDefinition> {
        match self.buffer_from {
            Some(found) if found != origin => Err(self.invalid(format!(
                "{} relations are measured from the {origin}, not the {found}",
                self.category
            ))),
            _ => Ok(()),
        }
    }

    fn to_kind(&self) -> Result<RelationKind, InvalidRelationDefinition> {
        match self.category {
            RelationCategory::Containment => {
                self.forbid("default_distance_m", self.default_distance_m)?;
                self.forbid("default_depth_m", self.default_depth_m)?;
                self.forbid("bearing_degrees", self.bearing_degrees)?;
                self.forbid("sector_width_degrees", self.sector_width_degrees)?;
                self.forbid("buffer_from", self.buffer_from)?;
                Ok(RelationKind::Containment)
            }
            RelationCategory::Buffer => {
                self.forbid("default_depth_m", self.default_depth_m)?;
                self.forbid("bearing_degrees", self.bearing_degrees)?;
                self.forbid("sector_width_degrees", self.sector_width_degrees)?;
                Ok(RelationKind::Buffer {
                    distance_m: self.require("default_distance_m", self.default_distance_m)?,
                    buffer_from: self.buffer_from.unwrap_or(BufferOrigin::Center),
                })
            }
            RelationCategory::Ring => {
                self.forbid("default_depth_m", self.default_depth_m)?;
                self.forbid("bearing_degrees", self.bearing_degrees)?;
                self.forbid("sector_width_degrees", self.sector_width_degrees)?;
                self.expect_origin(BufferOrigin::Edge)?;
                Ok(RelationKind::Ring {
                    distance_m: self.require("default_distance_m", self.default_distance_m)?,
                })
            }
            RelationCategory::Erosion => {
                self.forbid("default_distance_m", self.default_distance_m)?;
                self.forbid("bearing_degrees", self.bearing_degrees)?;
                self.forbid("sector_width_degrees", self.sector_width_degrees)?;
                self.expect_origin(BufferOrigin::Edge)?;
                Ok(RelationKind::Erosion {
                    depth_m: self.require("default_depth_m", self.default_depth_m)?,
                })
            }
            RelationCategory::Directional => {
                self.forbid("default_depth_m", self.default_depth_m)?;
                self.expect_origin(BufferOrigin::Center)?;
                if let Some(width) = self.sector_width_degrees {
                    if (width - SECTOR_WIDTH_DEGREES).abs() > f64::EPSILON {
                        return Err(self.invalid(format!(
                            "sector_width_degrees must be {SECTOR_WIDTH_DEGREES}, got {width}"
                        )));
                    }
                }
                let bearing = self.require("bearing_degrees", self.bearing_degrees)?;
                let direction = CompassDirection::from_bearing(bearing).ok_or_else(|| {
                    self.invalid(format!(
                        "bearing_degrees must be a multiple of 45 in [0, 360), got {bearing}"
                    ))
                })?;
                Ok(RelationKind::Directional {
                    direction,
                    distance_m: self.require("default_distance_m", self.default_distance_m)?,
                })
            }
        }
    }
}

impl TryFrom<RelationSpec> for RelationDefinition {
    type Error = InvalidRelationDefinition;

    fn try_from(spec: RelationSpec) -> Result<Self, Self::Error> {
        let kind = spec.to_kind()?;
        let definition = Self {
            name: spec.name,
            description: spec.description,
            applies_to: spec.applies_to,
            kind,
        };
        definition.validate()?;
        Ok(definition)
    }
}

impl From<&RelationDefinition> for RelationSpec {
    fn from(definition: &RelationDefinition) -> Self {
        let kind = definition.kind();
        Self {
            name: definition.name.clone(),
            category: kind.category(),
            description: definition.description.clone(),
            default_distance_m: kind.default_distance_m(),
            default_depth_m: kind.default_depth_m(),
            bearing_degrees: kind.bearing_degrees(),
            sector_width_degrees: kind.sector_width_degrees(),
            buffer_from: kind.buffer_from(),
            applies_to: definition.applies_to.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, category: RelationCategory) -> RelationSpec {
        RelationSpec {
            name: name.to_string(),
            category,
            description: String::new(),
            default_distance_m: None,
            default_depth_m: None,
            bearing_degrees: None,
            sector_width_degrees: None,
            buffer_from: None,
            applies_to: Vec::new(),
        }
    }

    #[test]
    fn bearings_round_trip_through_directions() {
        for direction in CompassDirection::all() {
            assert_eq!(
                CompassDirection::from_bearing(direction.bearing_degrees()),
                Some(*direction)
            );
        }
        assert_eq!(CompassDirection::from_bearing(-0.0), Some(CompassDirection::North));
        assert_eq!(CompassDirection::from_bearing(30.0), None);
        assert_eq!(CompassDirection::from_bearing(360.0), None);
    }

    #[test]
    fn directional_requires_bearing() {
        let mut s = spec("north_ish", RelationCategory::Directional);
        s.default_distance_m = Some(10_000.0);
        let err = RelationDefinition::try_from(s).unwrap_err();
        assert_eq!(err.name, "north_ish");
        assert!(err.reason.contains("bearing_degrees"), "{err}");
    }

    #[test]
    fn directional_rejects_other_sector_widths() {
        let mut s = spec("wide_north", RelationCategory::Directional);
        s.default_distance_m = Some(10_000.0);
        s.bearing_degrees = Some(0.0);
        s.sector_width_degrees = Some(120.0);
        assert!(RelationDefinition::try_from(s).is_err());
    }

    #[test]
    fn containment_forbids_distance() {
        let mut s = spec("inside", RelationCategory::Containment);
        s.default_distance_m = Some(100.0);
        let err = RelationDefinition::try_from(s).unwrap_err();
        assert!(err.reason.contains("default_distance_m"), "{err}");
    }

    #[test]
    fn erosion_requires_negative_depth() {
        let mut s = spec("deep_inside", RelationCategory::Erosion);
        s.default_depth_m = Some(500.0);
        assert!(RelationDefinition::try_from(s.clone()).is_err());

        s.default_depth_m = Some(-500.0);
        let definition = RelationDefinition::try_from(s).unwrap();
        assert_eq!(definition.kind(), &RelationKind::Erosion { depth_m: -500.0 });
    }

    #[test]
    fn ring_cannot_grow_from_center() {
        let mut s = spec("around_shore", RelationCategory::Ring);
        s.default_distance_m = Some(1_000.0);
        s.buffer_from = Some(BufferOrigin::Center);
        assert!(RelationDefinition::try_from(s).is_err());
    }

    #[test]
    fn buffer_defaults_to_center_origin() {
        let mut s = spec("very_close", RelationCategory::Buffer);
        s.default_distance_m = Some(500.0);
        let definition = RelationDefinition::try_from(s).unwrap();
        assert_eq!(definition.kind().buffer_from(), Some(BufferOrigin::Center));
    }

    #[test]
    fn rejects_non_snake_case_names() {
        for name in ["Near", "near-by", "", "9th", "near by"] {
            let definition = RelationDefinition::new(name, RelationKind::Containment);
            assert!(definition.validate().is_err(), "{name:?} should be rejected");
        }
        assert!(
            RelationDefinition::new("close_to_2", RelationKind::Containment)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn rejects_non_finite_distances() {
        let definition = RelationDefinition::new(
            "far",
            RelationKind::Buffer {
                distance_m: f64::NAN,
                buffer_from: BufferOrigin::Edge,
            },
        );
        assert!(definition.validate().is_err());
    }

    #[test]
    fn spec_round_trips_through_definition() {
        let definition = RelationDefinition::new(
            "south_of",
            RelationKind::Directional {
                direction: CompassDirection::South,
                distance_m: 10_000.0,
            },
        )
        .with_description("Directional sector south of reference");
        let spec = RelationSpec::from(&definition);
        assert_eq!(spec.bearing_degrees, Some(180.0));
        assert_eq!(spec.sector_width_degrees, Some(90.0));
        assert_eq!(RelationDefinition::try_from(spec).unwrap(), definition);
    }
}
