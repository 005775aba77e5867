//! Planar shape construction in a [`crate::projection::LocalFrame`].
//!
//! Arcs are approximated with [`SEGMENTS_PER_TURN`] segments per full turn.
//! Vertices sit exactly on the radius, so the largest radial error is at
//! segment midpoints: `1 - cos(pi / 64)`, about 0.12%.
//!
//! Bearings are degrees clockwise from north (`+y`), so a bearing `b` maps to
//! `(r sin b, r cos b)`.

use std::f64::consts::TAU;

use geo::algorithm::buffer::{Buffer, BufferStyle, LineCap, LineJoin};
use geo::{BooleanOps, Coord, Geometry, LineString, MultiPolygon, Polygon};

/// Segments used to approximate a full circle.
pub const SEGMENTS_PER_TURN: usize = 64;

/// Angle subtended by one arc segment, in radians.
const ARC_STEP: f64 = TAU / SEGMENTS_PER_TURN as f64;

fn on_bearing(center: Coord<f64>, bearing_rad: f64, radius: f64) -> Coord<f64> {
    let (sin_b, cos_b) = bearing_rad.sin_cos();
    Coord {
        x: center.x + radius * sin_b,
        y: center.y + radius * cos_b,
    }
}

/// A circle approximation with its exterior wound counter-clockwise.
#[must_use]
pub fn circle(center: Coord<f64>, radius: f64) -> Polygon<f64> {
    // Decreasing bearing is counter-clockwise.
    let ring: Vec<Coord<f64>> = (0..SEGMENTS_PER_TURN)
        .rev()
        .map(|k| on_bearing(center, ARC_STEP * k as f64, radius))
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// A sector wedge anchored at `center`, spanning `width_degrees` centred on
/// `bearing_degrees`, truncated at `radius`.
///
/// The arc uses the same angular step as [`circle`], so sectors whose edges
/// fall on multiples of that step share vertices exactly with their
/// neighbours and with the circle of the same radius.
#[must_use]
pub fn sector(
    center: Coord<f64>,
    bearing_degrees: f64,
    width_degrees: f64,
    radius: f64,
) -> Polygon<f64> {
    let segments = ((width_degrees / 360.0 * SEGMENTS_PER_TURN as f64).round() as usize).max(1);
    let start = (bearing_degrees - width_degrees / 2.0).to_radians();
    let step = width_degrees.to_radians() / segments as f64;

    let mut ring = Vec::with_capacity(segments + 2);
    ring.push(center);
    ring.extend(
        (0..=segments)
            .rev()
            .map(|k| on_bearing(center, start + step * k as f64, radius)),
    );
    Polygon::new(LineString::from(ring), vec![])
}

fn style(distance: f64) -> BufferStyle<f64> {
    BufferStyle::new(distance)
        .line_join(LineJoin::Round(ARC_STEP))
        .line_cap(LineCap::Round(ARC_STEP))
}

/// Buffers a planar geometry by `distance` meters.
///
/// Points become [`circle`]s (unioned for multi-points). Everything else is
/// offset with round joins and caps at the circle's angular step.
#[must_use]
pub fn buffer(geometry: &Geometry<f64>, distance: f64) -> MultiPolygon<f64> {
    match geometry {
        Geometry::Point(point) => MultiPolygon::new(vec![circle(point.0, distance)]),
        Geometry::MultiPoint(points) => points
            .iter()
            .map(|point| MultiPolygon::new(vec![circle(point.0, distance)]))
            .reduce(|acc, disc| acc.union(&disc))
            .unwrap_or_else(|| MultiPolygon::new(vec![])),
        other => other.buffer_with_style(style(distance)),
    }
}

/// The areal part of a geometry. Points and lines contribute nothing.
#[must_use]
pub fn polygonal_part(geometry: &Geometry<f64>) -> MultiPolygon<f64> {
    match geometry {
        Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon.clone()]),
        Geometry::MultiPolygon(polygons) => polygons.clone(),
        Geometry::Rect(rect) => MultiPolygon::new(vec![rect.to_polygon()]),
        Geometry::Triangle(triangle) => MultiPolygon::new(vec![triangle.to_polygon()]),
        Geometry::GeometryCollection(collection) => MultiPolygon::new(
            collection
                .iter()
                .flat_map(|g| polygonal_part(g).0)
                .collect(),
        ),
        Geometry::Point(_)
        | Geometry::MultiPoint(_)
        | Geometry::Line(_)
        | Geometry::LineString(_)
        | Geometry::MultiLineString(_) => MultiPolygon::new(vec![]),
    }
}

/// The band between the geometry's footprint and `distance` meters outside
/// it.
#[must_use]
pub fn ring(geometry: &Geometry<f64>, distance: f64) -> MultiPolygon<f64> {
    let outer = buffer(geometry, distance);
    let footprint = polygonal_part(geometry);
    if footprint.0.is_empty() {
        outer
    } else {
        outer.difference(&footprint)
    }
}

/// Shrinks the areal part of a geometry by `depth` meters (`depth < 0`).
///
/// Returns an empty multi-polygon when nothing survives, including for
/// points and lines which have no interior.
#[must_use]
pub fn erode(geometry: &Geometry<f64>, depth: f64) -> MultiPolygon<f64> {
    let footprint = polygonal_part(geometry);
    if footprint.0.is_empty() {
        return footprint;
    }
    footprint.buffer_with_style(style(depth))
}

#[cfg(test)]
mod tests {
    use geo::{Area, Contains, CoordsIter, Point};

    use super::*;

    const ORIGIN: Coord<f64> = Coord { x: 0.0, y: 0.0 };
    const RADIUS: f64 = 10_000.0;
    const CARDINAL: [f64; 4] = [0.0, 90.0, 180.0, 270.0];
    const INTERCARDINAL: [f64; 4] = [45.0, 135.0, 225.0, 315.0];

    fn union_all(polygons: &[Polygon<f64>]) -> MultiPolygon<f64> {
        polygons
            .iter()
            .map(|p| MultiPolygon::new(vec![p.clone()]))
            .reduce(|acc, p| acc.union(&p))
            .unwrap()
    }

    fn assert_partitions_circle(bearings: &[f64]) {
        let full = circle(ORIGIN, RADIUS).unsigned_area();
        let wedges: Vec<Polygon<f64>> = bearings
            .iter()
            .map(|&b| sector(ORIGIN, b, 90.0, RADIUS))
            .collect();

        let total: f64 = wedges.iter().map(Area::unsigned_area).sum();
        assert!((total - full).abs() / full < 1e-9, "sum {total} vs circle {full}");

        let covered = union_all(&wedges).unsigned_area();
        assert!((covered - full).abs() / full < 1e-5, "union {covered} vs circle {full}");

        for (i, a) in wedges.iter().enumerate() {
            for b in &wedges[i + 1..] {
                let overlap = a.intersection(b).unsigned_area();
                assert!(overlap / full < 1e-5, "overlap {overlap}");
            }
        }
    }

    #[test]
    fn circle_vertices_lie_on_radius() {
        let disc = circle(ORIGIN, RADIUS);
        assert_eq!(disc.exterior().coords_count(), SEGMENTS_PER_TURN + 1);
        for c in disc.exterior().coords() {
            assert!((c.x.hypot(c.y) - RADIUS).abs() < 1e-6);
        }
    }

    #[test]
    fn circle_radial_error_is_below_one_percent() {
        let disc = circle(ORIGIN, RADIUS);
        for line in disc.exterior().lines() {
            let mid = (line.start + line.end) / 2.0;
            let error = 1.0 - mid.x.hypot(mid.y) / RADIUS;
            assert!(error < 0.01, "radial error {error}");
        }
    }

    #[test]
    fn north_sector_spans_315_to_45() {
        let wedge = sector(ORIGIN, 0.0, 90.0, RADIUS);
        for c in wedge.exterior().coords() {
            assert!(c.y >= -1e-9, "{c:?} is south of the anchor");
            assert!(c.y + 1e-6 >= c.x.abs(), "{c:?} outside [315, 45]");
        }
        assert!(wedge.contains(&Point::new(0.0, RADIUS / 2.0)));
        assert!(!wedge.contains(&Point::new(RADIUS / 2.0, RADIUS / 4.0)));
    }

    #[test]
    fn cardinal_sectors_partition_the_circle() {
        assert_partitions_circle(&CARDINAL);
    }

    #[test]
    fn intercardinal_sectors_partition_the_circle() {
        assert_partitions_circle(&INTERCARDINAL);
    }

    #[test]
    fn all_eight_sectors_cover_the_circle() {
        let full = circle(ORIGIN, RADIUS).unsigned_area();
        let wedges: Vec<Polygon<f64>> = CARDINAL
            .iter()
            .chain(&INTERCARDINAL)
            .map(|&b| sector(ORIGIN, b, 90.0, RADIUS))
            .collect();
        let covered = union_all(&wedges).unsigned_area();
        assert!((covered - full).abs() / full < 1e-5);
    }

    #[test]
    fn ring_around_square_excludes_its_interior() {
        let square = Polygon::new(
            LineString::from(vec![
                (-1000.0, -1000.0),
                (1000.0, -1000.0),
                (1000.0, 1000.0),
                (-1000.0, 1000.0),
            ]),
            vec![],
        );
        let band = ring(&Geometry::Polygon(square.clone()), 500.0);

        assert!(!band.contains(&Point::new(0.0, 0.0)));
        assert!(!band.contains(&Point::new(900.0, 0.0)));
        assert!(band.contains(&Point::new(1200.0, 0.0)));
        assert!(!band.contains(&Point::new(1600.0, 0.0)));
        assert!(band.intersection(&square).unsigned_area() / square.unsigned_area() < 1e-4);
    }

    #[test]
    fn ring_around_point_is_a_disc() {
        let band = ring(&Geometry::Point(Point::new(0.0, 0.0)), 1000.0);
        assert!(band.contains(&Point::new(10.0, 10.0)));
    }

    #[test]
    fn erosion_shrinks_or_vanishes() {
        let square = Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (4000.0, 0.0),
                (4000.0, 4000.0),
                (0.0, 4000.0),
            ]),
            vec![],
        ));

        let core = erode(&square, -500.0);
        assert!(core.contains(&Point::new(2000.0, 2000.0)));
        assert!(!core.contains(&Point::new(250.0, 2000.0)));
        assert!((core.unsigned_area() / (3000.0 * 3000.0) - 1.0).abs() < 1e-3);

        assert!(erode(&square, -2500.0).0.is_empty());
    }

    #[test]
    fn erosion_of_a_line_is_empty() {
        let line = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (5000.0, 0.0)]));
        assert!(erode(&line, -10.0).0.is_empty());
    }

    #[test]
    fn multipoint_buffers_merge_overlapping_discs() {
        let points = Geometry::MultiPoint(vec![Point::new(0.0, 0.0), Point::new(500.0, 0.0)].into());
        let merged = buffer(&points, 1000.0);
        assert_eq!(merged.0.len(), 1);
        assert!(merged.contains(&Point::new(250.0, 900.0)));
    }
}
