//! Locally centred planar frames.
//!
//! Metric operations (buffers, sectors) are computed in a spherical azimuthal
//! equidistant projection centred on the reference geometry's centroid.
//! Distances and bearings measured from the centre are exact on the sphere,
//! and distortion stays negligible for geometries spanning a few hundred
//! kilometres.
//!
//! # Coordinate System
//!
//! - Geodetic input: `x` = longitude, `y` = latitude, degrees (WGS84)
//! - Planar output: `x` = meters east, `y` = meters north of the centre
//!
//! # Poles
//!
//! A planar ring that winds around a pole cannot be mapped back vertex by
//! vertex: in longitude/latitude it would become a band that misses the
//! pole. [`LocalFrame::unproject`] normalises such rings into `[-180, 180]`,
//! splits them at the antimeridian and closes them along the pole's
//! latitude, the usual plate carrée shape of a polar cap.

use std::f64::consts::PI;
use std::fmt;

use geo::{Centroid, Contains, Coord, Geometry, LineString, MapCoords, Point, Polygon};

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Errors raised while choosing a frame or reprojecting into or out of it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    /// The geometry has no coordinates, so no centre can be chosen.
    #[error("geometry is empty")]
    Empty,

    /// A coordinate is not a finite longitude/latitude pair.
    #[error("invalid geodetic coordinate ({x}, {y})")]
    InvalidCoordinate {
        /// Longitude as given.
        x: f64,
        /// Latitude as given.
        y: f64,
    },

    /// A coordinate sits on the far side of the globe from the frame centre,
    /// where the projection is undefined.
    #[error("coordinate ({x}, {y}) is antipodal to the frame centre")]
    Antipodal {
        /// Longitude or easting as given.
        x: f64,
        /// Latitude or northing as given.
        y: f64,
    },
}

/// A spherical azimuthal equidistant projection centred on one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    lon0: f64,
    lat0: f64,
    sin_lat0: f64,
    cos_lat0: f64,
}

impl LocalFrame {
    /// Creates a frame centred on a geodetic point (`x` = lon, `y` = lat).
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidCoordinate`] if the centre is not a
    /// valid longitude/latitude.
    pub fn centered_on(center: Point<f64>) -> Result<Self, ProjectionError> {
        check_geodetic(center.0)?;
        let lat0 = center.y().to_radians();
        Ok(Self {
            lon0: center.x().to_radians(),
            lat0,
            sin_lat0: lat0.sin(),
            cos_lat0: lat0.cos(),
        })
    }

    /// Creates a frame centred on the geodetic centroid of `geometry`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Empty`] for geometries without a centroid,
    /// or [`ProjectionError::InvalidCoordinate`] if the centroid is invalid.
    pub fn for_geometry(geometry: &Geometry<f64>) -> Result<Self, ProjectionError> {
        let centroid = geometry.centroid().ok_or(ProjectionError::Empty)?;
        Self::centered_on(centroid)
    }

    /// Geodetic centre of the frame.
    #[must_use]
    pub fn center(&self) -> Point<f64> {
        Point::new(self.lon0.to_degrees(), self.lat0.to_degrees())
    }

    /// Projects one geodetic coordinate into the frame.
    ///
    /// # Errors
    ///
    /// Fails for invalid or antipodal coordinates.
    pub fn forward(&self, coord: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
        check_geodetic(coord)?;
        let lat = coord.y.to_radians();
        let d_lon = coord.x.to_radians() - self.lon0;
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_dlon, cos_dlon) = d_lon.sin_cos();

        let cos_c = (self.sin_lat0 * sin_lat + self.cos_lat0 * cos_lat * cos_dlon).clamp(-1.0, 1.0);
        let c = cos_c.acos();
        if PI - c < 1e-9 {
            return Err(ProjectionError::Antipodal {
                x: coord.x,
                y: coord.y,
            });
        }
        let k = if c < 1e-12 { 1.0 } else { c / c.sin() };

        Ok(Coord {
            x: EARTH_RADIUS_M * k * cos_lat * sin_dlon,
            y: EARTH_RADIUS_M * k * (self.cos_lat0 * sin_lat - self.sin_lat0 * cos_lat * cos_dlon),
        })
    }

    /// Maps one planar coordinate back to geodetic longitude/latitude.
    ///
    /// Longitudes are not wrapped into `[-180, 180]` so that rings crossing
    /// the antimeridian stay continuous.
    ///
    /// # Errors
    ///
    /// Fails for non-finite coordinates or points further than half the
    /// Earth's circumference from the centre.
    pub fn inverse(&self, coord: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return Err(ProjectionError::InvalidCoordinate {
                x: coord.x,
                y: coord.y,
            });
        }
        let rho = coord.x.hypot(coord.y);
        if rho < 1e-9 {
            return Ok(self.center().0);
        }
        let c = rho / EARTH_RADIUS_M;
        if c >= PI {
            return Err(ProjectionError::Antipodal {
                x: coord.x,
                y: coord.y,
            });
        }
        let (sin_c, cos_c) = c.sin_cos();

        let lat = (cos_c * self.sin_lat0 + coord.y * sin_c * self.cos_lat0 / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lon = self.lon0
            + (coord.x * sin_c).atan2(rho * self.cos_lat0 * cos_c - coord.y * self.sin_lat0 * sin_c);

        Ok(Coord {
            x: lon.to_degrees(),
            y: lat.to_degrees(),
        })
    }

    /// Projects every coordinate of a geodetic geometry into the frame.
    ///
    /// # Errors
    ///
    /// Fails on the first coordinate [`Self::forward`] rejects.
    pub fn project(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>, ProjectionError> {
        geometry.try_map_coords(|coord| self.forward(coord))
    }

    /// Maps every coordinate of a planar geometry back to geodetic.
    ///
    /// Polygon rings enclosing a pole are closed through that pole (see the
    /// module docs).
    ///
    /// # Errors
    ///
    /// Fails on the first coordinate [`Self::inverse`] rejects.
    pub fn unproject(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>, ProjectionError> {
        match geometry {
            Geometry::Polygon(polygon) => Ok(Geometry::Polygon(self.unproject_polygon(polygon)?)),
            Geometry::MultiPolygon(polygons) => Ok(Geometry::MultiPolygon(
                polygons
                    .iter()
                    .map(|polygon| self.unproject_polygon(polygon))
                    .collect::<Result<Vec<_>, _>>()?
                    .into(),
            )),
            other => other.try_map_coords(|coord| self.inverse(coord)),
        }
    }

    fn unproject_polygon(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>, ProjectionError> {
        let poles = self.planar_poles();
        let exterior = self.unproject_ring(polygon.exterior(), &poles)?;
        let interiors = polygon
            .interiors()
            .iter()
            .map(|ring| self.unproject_ring(ring, &poles))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon::new(exterior, interiors))
    }

    /// Latitude and planar position of each pole the frame can reach.
    fn planar_poles(&self) -> Vec<(f64, Coord<f64>)> {
        let lon = self.center().x();
        [90.0, -90.0]
            .into_iter()
            .filter_map(|lat| {
                self.forward(Coord { x: lon, y: lat })
                    .ok()
                    .map(|planar| (lat, planar))
            })
            .collect()
    }

    fn unproject_ring(
        &self,
        ring: &LineString<f64>,
        poles: &[(f64, Coord<f64>)],
    ) -> Result<LineString<f64>, ProjectionError> {
        let coords = ring
            .coords()
            .map(|&coord| self.inverse(coord))
            .collect::<Result<Vec<_>, _>>()?;

        let planar = Polygon::new(ring.clone(), vec![]);
        let enclosed = poles
            .iter()
            .find(|(_, pole)| planar.contains(&Point::from(*pole)));

        Ok(match enclosed {
            Some(&(pole_lat, _)) => {
                log::debug!("Closing ring through the pole at latitude {pole_lat}");
                close_through_pole(coords, pole_lat)
            }
            None => LineString::from(coords),
        })
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Rebuilds a geodetic ring that winds once around the pole at `pole_lat`
/// as a cap: it starts and ends on the antimeridian and runs along the
/// pole's latitude between the two ends.
fn close_through_pole(mut coords: Vec<Coord<f64>>, pole_lat: f64) -> LineString<f64> {
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    for coord in &mut coords {
        coord.x = wrap_longitude(coord.x);
    }

    let n = coords.len();
    let Some(i) = (0..n).find(|&i| (coords[(i + 1) % n].x - coords[i].x).abs() > 180.0) else {
        return LineString::from(coords);
    };

    // Edge a -> b crosses the antimeridian on the `side` meridian.
    let a = coords[i];
    let b = coords[(i + 1) % n];
    let side = if a.x > 0.0 { 180.0 } else { -180.0 };
    let b_x = b.x + 2.0 * side;
    let t = (side - a.x) / (b_x - a.x);
    let crossing_lat = a.y + t * (b.y - a.y);

    let mut ring = Vec::with_capacity(n + 4);
    ring.push(Coord {
        x: -side,
        y: crossing_lat,
    });
    let mut previous = -side;
    for k in 1..=n {
        let mut coord = coords[(i + k) % n];
        // Keep the path continuous if it crosses back and forth.
        while coord.x - previous > 180.0 {
            coord.x -= 360.0;
        }
        while coord.x - previous < -180.0 {
            coord.x += 360.0;
        }
        previous = coord.x;
        ring.push(coord);
    }
    ring.push(Coord {
        x: side,
        y: crossing_lat,
    });
    ring.push(Coord {
        x: side,
        y: pole_lat,
    });
    ring.push(Coord {
        x: -side,
        y: pole_lat,
    });
    LineString::from(ring)
}

/// PROJ definition string of the frame.
impl fmt::Display for LocalFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let center = self.center();
        write!(
            f,
            "+proj=aeqd +lat_0={:.6} +lon_0={:.6} +R={EARTH_RADIUS_M} +units=m +no_defs",
            center.y(),
            center.x()
        )
    }
}

fn check_geodetic(coord: Coord<f64>) -> Result<(), ProjectionError> {
    let valid = coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y);
    if valid {
        Ok(())
    } else {
        Err(ProjectionError::InvalidCoordinate {
            x: coord.x,
            y: coord.y,
        })
    }
}
