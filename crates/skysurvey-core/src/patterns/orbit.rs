//! Orbit pattern: concentric circles around a point of interest, each ring
//! climbing and tilting the gimbal for facade and 3D-reconstruction coverage.

use crate::models::{FlightParameters, GeoCoordinate, Waypoint};
use crate::projection::{LocalProjection, ProjectedPoint};

pub const DEFAULT_PHOTOS_PER_ORBIT: u32 = 36;
pub const START_GIMBAL_PITCH_DEG: f64 = -45.0;

const MAX_ORBIT_COUNT: u8 = 5;
/// The gimbal shallows by this much per ring but never flattens past the
/// floor, which keeps the subject in frame from the highest ring.
const GIMBAL_STEP_PER_RING_DEG: f64 = 10.0;
const GIMBAL_PITCH_FLOOR_DEG: f64 = -15.0;

/// Generate orbit waypoints around an explicit center.
pub fn from_center(
    center: &GeoCoordinate,
    radius_m: f64,
    orbit_count: u8,
    altitude_step_m: f64,
    photos_per_orbit: u32,
    flight: &FlightParameters,
) -> Vec<Waypoint> {
    if radius_m <= 0.0 || photos_per_orbit == 0 {
        return Vec::new();
    }
    let orbit_count = orbit_count.clamp(1, MAX_ORBIT_COUNT);
    let projection = LocalProjection::new(*center);

    let mut waypoints = Vec::new();
    let mut next_index = 0u32;
    for ring in 0..orbit_count {
        let altitude = flight.altitude_m + ring as f64 * altitude_step_m;
        let gimbal = (START_GIMBAL_PITCH_DEG + GIMBAL_STEP_PER_RING_DEG * ring as f64)
            .min(GIMBAL_PITCH_FLOOR_DEG);
        for i in 0..photos_per_orbit {
            let theta_deg = i as f64 * 360.0 / photos_per_orbit as f64;
            let theta = theta_deg.to_radians();
            let point = ProjectedPoint::new(radius_m * theta.sin(), radius_m * theta.cos());
            let coord = projection.unproject(point);
            waypoints.push(Waypoint {
                index: next_index,
                longitude: coord.longitude,
                latitude: coord.latitude,
                altitude_m: altitude,
                // Face the center: opposite the bearing out from it.
                heading_deg: (theta_deg + 180.0) % 360.0,
                gimbal_pitch_deg: gimbal,
                speed_mps: flight.max_speed_mps,
                take_photo: true,
            });
            next_index += 1;
        }
    }
    waypoints
}

/// Generate orbit waypoints around a polygon's centroid, with the radius
/// sized to clear the farthest vertex.
pub fn from_polygon(vertices: &[GeoCoordinate], flight: &FlightParameters) -> Vec<Waypoint> {
    const DEFAULT_ORBIT_COUNT: u8 = 3;
    const DEFAULT_ALTITUDE_STEP_M: f64 = 10.0;
    const POLYGON_PHOTOS_PER_ORBIT: u32 = 24;
    const RADIUS_MARGIN: f64 = 1.2;

    if vertices.len() < 3 {
        return Vec::new();
    }
    let Some(projection) = LocalProjection::centered_on(vertices) else {
        return Vec::new();
    };
    let points = projection.project_all(vertices);
    let centroid = super::polygon_centroid(&points);
    let farthest = points
        .iter()
        .map(|p| p.distance_to(&centroid))
        .fold(0.0f64, f64::max);
    if farthest <= 0.0 {
        return Vec::new();
    }

    let center = projection.unproject(centroid);
    from_center(
        &center,
        farthest * RADIUS_MARGIN,
        DEFAULT_ORBIT_COUNT,
        DEFAULT_ALTITUDE_STEP_M,
        POLYGON_PHOTOS_PER_ORBIT,
        flight,
    )
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_flight;
    use super::*;
    use crate::projection::haversine_distance;

    const CENTER: GeoCoordinate = GeoCoordinate {
        longitude: -117.0,
        latitude: 33.0,
    };

    #[test]
    fn zero_radius_yields_empty() {
        let flight = test_flight();
        assert!(from_center(&CENTER, 0.0, 3, 10.0, 36, &flight).is_empty());
        assert!(from_center(&CENTER, -5.0, 3, 10.0, 36, &flight).is_empty());
    }

    #[test]
    fn single_ring_stations_sit_on_the_circle() {
        let flight = test_flight();
        let wps = from_center(&CENTER, 80.0, 1, 10.0, 36, &flight);
        assert_eq!(wps.len(), 36);
        for wp in &wps {
            let d = haversine_distance(CENTER.latitude, CENTER.longitude, wp.latitude, wp.longitude);
            assert!((d - 80.0).abs() < 0.5, "distance {d}");
            assert!((wp.altitude_m - flight.altitude_m).abs() < 1e-9);
            assert!(wp.take_photo);
        }
    }

    #[test]
    fn headings_face_the_center() {
        let flight = test_flight();
        let wps = from_center(&CENTER, 100.0, 1, 10.0, 4, &flight);
        assert_eq!(wps.len(), 4);
        // Station 0 is due north of center, so it faces south, and so on
        // around the circle.
        let expected = [180.0, 270.0, 0.0, 90.0];
        for (wp, want) in wps.iter().zip(expected) {
            assert!((wp.heading_deg - want).abs() < 0.01, "heading {}", wp.heading_deg);
        }
    }

    #[test]
    fn rings_climb_and_shallow_the_gimbal() {
        let flight = test_flight();
        let wps = from_center(&CENTER, 80.0, 5, 12.0, 8, &flight);
        assert_eq!(wps.len(), 40);
        let ring = |n: usize| &wps[n * 8];
        assert!((ring(0).altitude_m - flight.altitude_m).abs() < 1e-9);
        assert!((ring(4).altitude_m - (flight.altitude_m + 48.0)).abs() < 1e-9);
        assert!((ring(0).gimbal_pitch_deg - -45.0).abs() < 1e-9);
        assert!((ring(2).gimbal_pitch_deg - -25.0).abs() < 1e-9);
        // Rings 3 and up clamp at the floor instead of flattening out.
        assert!((ring(3).gimbal_pitch_deg - -15.0).abs() < 1e-9);
        assert!((ring(4).gimbal_pitch_deg - -15.0).abs() < 1e-9);
    }

    #[test]
    fn orbit_count_is_clamped() {
        let flight = test_flight();
        let wps = from_center(&CENTER, 50.0, 200, 10.0, 12, &flight);
        assert_eq!(wps.len(), 5 * 12);
        let wps = from_center(&CENTER, 50.0, 0, 10.0, 12, &flight);
        assert_eq!(wps.len(), 12);
    }

    #[test]
    fn polygon_orbit_clears_every_vertex() {
        use crate::projection::{meters_per_deg_lat, meters_per_deg_lon};
        let m_lat = meters_per_deg_lat(CENTER.latitude);
        let m_lon = meters_per_deg_lon(CENTER.latitude);
        let at = |x_m: f64, y_m: f64| {
            GeoCoordinate::new(CENTER.longitude + x_m / m_lon, CENTER.latitude + y_m / m_lat)
        };
        let verts = vec![at(0.0, 0.0), at(120.0, 0.0), at(120.0, 80.0), at(0.0, 80.0)];
        let flight = test_flight();
        let wps = from_polygon(&verts, &flight);
        assert_eq!(wps.len(), 3 * 24);

        // Every station is farther from every vertex's centroid distance
        // times the margin, so the orbit circles outside the area.
        let half_diag = (60.0f64 * 60.0 + 40.0 * 40.0).sqrt();
        let centroid = at(60.0, 40.0);
        for wp in &wps[..24] {
            let d = haversine_distance(centroid.latitude, centroid.longitude, wp.latitude, wp.longitude);
            assert!(d > half_diag, "station inside the area: {d}");
        }
    }
}
