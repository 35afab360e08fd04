//! Geodetic/planar conversions and distance math.
//!
//! Pattern geometry (clipping, offsetting, rotation) needs a locally
//! Euclidean frame. [`LocalProjection`] is a per-operation session value:
//! it is created once from the centroid of the input geometry and every
//! point of that operation projects through it. Mixing projections from
//! different operations in one geometry call is a contract violation.

use crate::models::GeoCoordinate;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point in the local planar frame, meters east (x) / north (y) of the
/// projection origin. Only meaningful together with the [`LocalProjection`]
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &ProjectedPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Locally conformal planar frame centered on an origin coordinate.
#[derive(Debug, Clone)]
pub struct LocalProjection {
    origin: GeoCoordinate,
    m_per_deg_lat: f64,
    m_per_deg_lon: f64,
}

impl LocalProjection {
    /// Frame centered on an explicit origin.
    pub fn new(origin: GeoCoordinate) -> Self {
        Self {
            origin,
            m_per_deg_lat: meters_per_deg_lat(origin.latitude),
            m_per_deg_lon: meters_per_deg_lon(origin.latitude).max(1e-9),
        }
    }

    /// Frame centered on the centroid of the given coordinates.
    ///
    /// Returns `None` for an empty slice; callers treat that the same as
    /// insufficient input geometry.
    pub fn centered_on(coords: &[GeoCoordinate]) -> Option<Self> {
        if coords.is_empty() {
            return None;
        }
        let n = coords.len() as f64;
        let lon = coords.iter().map(|c| c.longitude).sum::<f64>() / n;
        let lat = coords.iter().map(|c| c.latitude).sum::<f64>() / n;
        Some(Self::new(GeoCoordinate::new(lon, lat)))
    }

    pub fn origin(&self) -> GeoCoordinate {
        self.origin
    }

    pub fn project(&self, coord: &GeoCoordinate) -> ProjectedPoint {
        ProjectedPoint {
            x: (coord.longitude - self.origin.longitude) * self.m_per_deg_lon,
            y: (coord.latitude - self.origin.latitude) * self.m_per_deg_lat,
        }
    }

    pub fn unproject(&self, point: ProjectedPoint) -> GeoCoordinate {
        GeoCoordinate {
            longitude: self.origin.longitude + point.x / self.m_per_deg_lon,
            latitude: self.origin.latitude + point.y / self.m_per_deg_lat,
        }
    }

    pub fn project_all(&self, coords: &[GeoCoordinate]) -> Vec<ProjectedPoint> {
        coords.iter().map(|c| self.project(c)).collect()
    }
}

/// Heading from one projected point to another, in degrees clockwise from
/// geographic north, normalized into [0, 360).
pub fn heading_between(from: ProjectedPoint, to: ProjectedPoint) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let heading = dx.atan2(dy).to_degrees();
    (heading + 360.0) % 360.0
}

/// Great-circle distance between two points in meters (Haversine formula).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}
