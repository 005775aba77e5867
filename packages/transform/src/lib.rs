#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial relation transformation engine.
//!
//! Turns a reference geometry (geodetic WGS84) and a named spatial relation
//! into a search-area geometry. Each call picks a [`LocalFrame`] centred on
//! the reference, applies the relation's operation there in meters, and
//! maps the result back to longitude/latitude.
//!
//! The engine owns its [`RelationRegistry`] and only reads it, so a built
//! engine can be shared freely across threads.

pub mod projection;
pub mod shapes;

use geo::{Coord, CoordsIter, Geometry};
use search_area_relation::{
    BufferOrigin, RelationDefinition, RelationError, RelationKind, RelationRegistry,
    SECTOR_WIDTH_DEGREES,
};

pub use projection::{EARTH_RADIUS_M, LocalFrame, ProjectionError};

/// Distances above this are suspicious but still applied.
const LARGE_DISTANCE_M: f64 = 100_000.0;

/// Half the Earth's circumference. A distance this long reaches the
/// antipode of the frame centre, where the projection is undefined.
pub const MAX_DISTANCE_M: f64 = std::f64::consts::PI * EARTH_RADIUS_M;

/// Erosion deeper than this is likely to erase the whole reference.
const LARGE_DEPTH_M: f64 = -5_000.0;

/// Errors that can occur while applying a relation.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The relation name did not resolve.
    #[error(transparent)]
    UnknownRelation(#[from] RelationError),

    /// An override has the wrong sign, is not finite, or does not apply to
    /// the relation's category.
    #[error("invalid {parameter} {value} for relation '{relation}': {reason}")]
    InvalidParameter {
        /// Relation the override was given for.
        relation: String,
        /// Which override was rejected.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
        /// Why it was rejected.
        reason: String,
    },

    /// The reference geometry is empty or cannot be reprojected.
    #[error("degenerate reference geometry: {0}")]
    DegenerateGeometry(#[from] ProjectionError),
}

/// Input to [`TransformEngine::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    /// Reference geometry in geodetic WGS84 (`x` = lon, `y` = lat).
    pub reference_geometry: Geometry<f64>,
    /// Name of a registered relation.
    pub relation_name: String,
    /// Replaces the relation's default distance (buffer, ring, directional).
    pub override_distance_m: Option<f64>,
    /// Replaces the relation's default depth (erosion).
    pub override_depth_m: Option<f64>,
}

impl TransformRequest {
    #[must_use]
    pub fn new(reference_geometry: Geometry<f64>, relation_name: impl Into<String>) -> Self {
        Self {
            reference_geometry,
            relation_name: relation_name.into(),
            override_distance_m: None,
            override_depth_m: None,
        }
    }

    #[must_use]
    pub const fn with_distance(mut self, distance_m: f64) -> Self {
        self.override_distance_m = Some(distance_m);
        self
    }

    #[must_use]
    pub const fn with_depth(mut self, depth_m: f64) -> Self {
        self.override_depth_m = Some(depth_m);
        self
    }
}

/// Output of [`TransformEngine::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    /// Search area in geodetic WGS84.
    pub geometry: Geometry<f64>,
    /// Name of the relation that was applied.
    pub relation_applied: String,
    /// Distance used by buffer, ring and directional relations.
    pub effective_distance_m: Option<f64>,
    /// Depth used by erosion relations.
    pub effective_depth_m: Option<f64>,
    /// PROJ string of the planar frame the operation ran in.
    pub source_crs_used: String,
}

impl TransformResult {
    /// Whether the search area has no coordinates at all.
    ///
    /// Erosion deeper than the reference's inner radius ends up here. That
    /// is a valid outcome meaning "no interior region exists".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometry.coords_count() == 0
    }
}

/// The planar operation a relation resolved to, with its effective
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operation {
    Identity,
    Disc { distance: f64 },
    Buffer { distance: f64 },
    Ring { distance: f64 },
    Erode { depth: f64 },
    Sector { bearing: f64, distance: f64 },
}

impl Operation {
    const fn effective_distance(self) -> Option<f64> {
        match self {
            Self::Disc { distance }
            | Self::Buffer { distance }
            | Self::Ring { distance }
            | Self::Sector { distance, .. } => Some(distance),
            Self::Identity | Self::Erode { .. } => None,
        }
    }

    const fn effective_depth(self) -> Option<f64> {
        match self {
            Self::Erode { depth } => Some(depth),
            _ => None,
        }
    }
}

/// Applies registered spatial relations to reference geometries.
#[derive(Debug, Clone, Default)]
pub struct TransformEngine {
    registry: RelationRegistry,
}

impl TransformEngine {
    /// Creates an engine over a fully populated registry.
    #[must_use]
    pub const fn new(registry: RelationRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub const fn registry(&self) -> &RelationRegistry {
        &self.registry
    }

    /// Applies the requested relation to the reference geometry.
    ///
    /// # Errors
    ///
    /// * [`TransformError::UnknownRelation`] if the relation is not registered
    /// * [`TransformError::InvalidParameter`] if an override is rejected
    /// * [`TransformError::DegenerateGeometry`] if the geometry is empty or
    ///   has coordinates that cannot be projected
    pub fn apply(&self, request: &TransformRequest) -> Result<TransformResult, TransformError> {
        let relation = self.registry.get(&request.relation_name)?;
        let operation = resolve_operation(relation, request)?;

        let frame = LocalFrame::for_geometry(&request.reference_geometry)?;
        log::debug!("Applying '{}' as {operation:?} in {frame}", relation.name());

        let planar = frame.project(&request.reference_geometry)?;
        let anchor = Coord { x: 0.0, y: 0.0 };

        let geometry = match operation {
            Operation::Identity => request.reference_geometry.clone(),
            Operation::Disc { distance } => {
                frame.unproject(&Geometry::Polygon(shapes::circle(anchor, distance)))?
            }
            Operation::Buffer { distance } => {
                frame.unproject(&Geometry::MultiPolygon(shapes::buffer(&planar, distance)))?
            }
            Operation::Ring { distance } => {
                frame.unproject(&Geometry::MultiPolygon(shapes::ring(&planar, distance)))?
            }
            Operation::Erode { depth } => {
                let core = shapes::erode(&planar, depth);
                if core.0.is_empty() {
                    log::debug!("Erosion by {depth}m left nothing of the reference geometry");
                }
                frame.unproject(&Geometry::MultiPolygon(core))?
            }
            Operation::Sector { bearing, distance } => frame.unproject(&Geometry::Polygon(
                shapes::sector(anchor, bearing, SECTOR_WIDTH_DEGREES, distance),
            ))?,
        };

        Ok(TransformResult {
            geometry,
            relation_applied: relation.name().to_string(),
            effective_distance_m: operation.effective_distance(),
            effective_depth_m: operation.effective_depth(),
            source_crs_used: frame.to_string(),
        })
    }
}

/// Picks the operation for the relation and the override or default its
/// category calls for.
///
/// Overrides are validated, never clamped: a wrong sign, a non-finite value
/// or an override the category has no use for is an error.
fn resolve_operation(
    relation: &RelationDefinition,
    request: &TransformRequest,
) -> Result<Operation, TransformError> {
    let invalid = |parameter: &'static str, value: f64, reason: &str| {
        TransformError::InvalidParameter {
            relation: relation.name().to_string(),
            parameter,
            value,
            reason: reason.to_string(),
        }
    };
    let category = relation.category();

    match *relation.kind() {
        RelationKind::Containment => {
            if let Some(value) = request.override_distance_m {
                return Err(invalid(
                    "override_distance_m",
                    value,
                    "containment relations take no distance",
                ));
            }
            if let Some(value) = request.override_depth_m {
                return Err(invalid(
                    "override_depth_m",
                    value,
                    "containment relations take no depth",
                ));
            }
            Ok(Operation::Identity)
        }
        RelationKind::Erosion { depth_m } => {
            if let Some(value) = request.override_distance_m {
                return Err(invalid(
                    "override_distance_m",
                    value,
                    "erosion relations take a depth, not a distance",
                ));
            }
            let depth = match request.override_depth_m {
                Some(value) if !value.is_finite() || value >= 0.0 => {
                    return Err(invalid(
                        "override_depth_m",
                        value,
                        "depth must be finite and < 0",
                    ));
                }
                Some(value) => value,
                None => depth_m,
            };
            if depth < LARGE_DEPTH_M {
                log::warn!(
                    "Large negative buffer of {depth}m for '{}' may eliminate the reference geometry",
                    relation.name()
                );
            }
            Ok(Operation::Erode { depth })
        }
        kind @ (RelationKind::Buffer { distance_m, .. }
        | RelationKind::Ring { distance_m }
        | RelationKind::Directional { distance_m, .. }) => {
            if let Some(value) = request.override_depth_m {
                return Err(invalid(
                    "override_depth_m",
                    value,
                    &format!("{category} relations take a distance, not a depth"),
                ));
            }
            let (parameter, distance) = match request.override_distance_m {
                Some(value) if !value.is_finite() || value <= 0.0 => {
                    return Err(invalid(
                        "override_distance_m",
                        value,
                        "distance must be finite and > 0",
                    ));
                }
                Some(value) => ("override_distance_m", value),
                None => ("default_distance_m", distance_m),
            };
            if distance >= MAX_DISTANCE_M {
                return Err(invalid(
                    parameter,
                    distance,
                    &format!(
                        "distance must be below half the Earth's circumference ({MAX_DISTANCE_M:.0}m)"
                    ),
                ));
            }
            if distance > LARGE_DISTANCE_M {
                log::warn!(
                    "Large buffer distance of {distance}m for '{}' may be slow to query",
                    relation.name()
                );
            }
            Ok(match kind {
                RelationKind::Buffer {
                    buffer_from: BufferOrigin::Center,
                    ..
                } => Operation::Disc { distance },
                RelationKind::Ring { .. } => Operation::Ring { distance },
                RelationKind::Directional { direction, .. } => Operation::Sector {
                    bearing: direction.bearing_degrees(),
                    distance,
                },
                _ => Operation::Buffer { distance },
            })
        }
    }
}
