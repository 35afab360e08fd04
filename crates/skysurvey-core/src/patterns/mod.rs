//! Pattern engine: turns an area definition plus flight parameters into
//! ordered waypoint geometry.
//!
//! The strategy set is closed (grid, double grid, corridor, orbit), so
//! dispatch is a match over [`PatternKind`] and the supplied
//! [`AreaDefinition`] rather than a trait object. All geometry runs in a
//! per-call [`LocalProjection`] frame; degenerate input (too few vertices)
//! yields an empty waypoint list, not an error.

mod corridor;
mod grid;
mod orbit;

pub use orbit::{DEFAULT_PHOTOS_PER_ORBIT, START_GIMBAL_PITCH_DEG};

use crate::error::PlanError;
use crate::models::{AreaDefinition, FlightParameters, PatternKind, Waypoint};
use crate::projection::{heading_between, LocalProjection, ProjectedPoint};
use crate::rules::MissionRules;
use tracing::warn;

/// Generate the ordered waypoint sequence for a mission.
///
/// `angle_deg` orients grid/double-grid scan lines; corridor and orbit
/// ignore it. A pattern/area combination that makes no sense (e.g. grid
/// over an orbit definition) is a caller contract violation and errors;
/// an area with too few vertices returns an empty sequence so the caller
/// can report "insufficient geometry".
pub fn generate_waypoints(
    area: &AreaDefinition,
    flight: &FlightParameters,
    pattern: PatternKind,
    angle_deg: f64,
) -> Result<Vec<Waypoint>, PlanError> {
    let waypoints = match (pattern, area) {
        (PatternKind::Grid, AreaDefinition::Polygon { vertices }) => {
            grid::generate(vertices, flight, angle_deg)
        }
        (PatternKind::DoubleGrid, AreaDefinition::Polygon { vertices }) => {
            grid::generate_double(vertices, flight, angle_deg)
        }
        (
            PatternKind::Corridor,
            AreaDefinition::Corridor {
                centerline,
                width_m,
                line_count,
            },
        ) => corridor::from_centerline(centerline, *width_m, *line_count, flight),
        (PatternKind::Corridor, AreaDefinition::Polygon { vertices }) => {
            corridor::from_polygon(vertices, flight)
        }
        (
            PatternKind::Orbit,
            AreaDefinition::Orbit {
                center,
                radius_m,
                orbit_count,
                altitude_step_m,
            },
        ) => orbit::from_center(
            center,
            *radius_m,
            *orbit_count,
            *altitude_step_m,
            orbit::DEFAULT_PHOTOS_PER_ORBIT,
            flight,
        ),
        (PatternKind::Orbit, AreaDefinition::Polygon { vertices }) => {
            orbit::from_polygon(vertices, flight)
        }
        (pattern, area) => {
            return Err(PlanError::PatternAreaMismatch {
                pattern,
                area: area.kind_name(),
            })
        }
    };

    let ceiling = MissionRules::default().max_waypoints_per_mission;
    if waypoints.len() > ceiling {
        warn!(
            count = waypoints.len(),
            ceiling, "generated mission exceeds firmware waypoint ceiling"
        );
    }

    Ok(waypoints)
}

// ==== Shared plane geometry ====

/// Total length of a polyline in meters.
pub(crate) fn polyline_length(points: &[ProjectedPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum()
}

/// Point at the given arc-length fraction (0..=1) along a polyline.
pub(crate) fn interpolate_along(points: &[ProjectedPoint], fraction: f64) -> ProjectedPoint {
    debug_assert!(points.len() >= 2);
    let total = polyline_length(points);
    if total <= f64::EPSILON {
        return points[0];
    }
    let mut remaining = fraction.clamp(0.0, 1.0) * total;
    for pair in points.windows(2) {
        let seg_len = pair[0].distance_to(&pair[1]);
        if remaining <= seg_len {
            if seg_len <= f64::EPSILON {
                return pair[0];
            }
            let t = remaining / seg_len;
            return ProjectedPoint::new(
                pair[0].x + t * (pair[1].x - pair[0].x),
                pair[0].y + t * (pair[1].y - pair[0].y),
            );
        }
        remaining -= seg_len;
    }
    *points.last().unwrap_or(&points[0])
}

/// Sample photo stations along one flight line and append them as
/// waypoints.
///
/// Stations are placed at photo-spacing intervals by arc-length fraction,
/// always including both endpoints. Heading follows the line's start->end
/// bearing; gimbal is nadir.
pub(crate) fn sample_line_waypoints(
    line: &[ProjectedPoint],
    projection: &LocalProjection,
    flight: &FlightParameters,
    next_index: &mut u32,
    out: &mut Vec<Waypoint>,
) {
    if line.len() < 2 {
        return;
    }
    let length = polyline_length(line);
    if length <= f64::EPSILON || flight.photo_spacing_m <= 0.0 {
        return;
    }

    let heading = heading_between(line[0], line[line.len() - 1]);
    let num_stations = ((length / flight.photo_spacing_m) as usize + 1).max(2);

    for j in 0..num_stations {
        let fraction = j as f64 / (num_stations - 1) as f64;
        let point = interpolate_along(line, fraction);
        let coord = projection.unproject(point);
        out.push(Waypoint {
            index: *next_index,
            longitude: coord.longitude,
            latitude: coord.latitude,
            altitude_m: flight.altitude_m,
            heading_deg: heading,
            gimbal_pitch_deg: -90.0,
            speed_mps: flight.max_speed_mps,
            take_photo: true,
        });
        *next_index += 1;
    }
}

/// Ray-cast point-in-polygon test.
pub(crate) fn point_in_polygon(point: ProjectedPoint, polygon: &[ProjectedPoint]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);
        if ((yi > point.y) != (yj > point.y))
            && (point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Area centroid of a simple polygon; falls back to the vertex mean when
/// the signed area is (near) zero.
pub(crate) fn polygon_centroid(polygon: &[ProjectedPoint]) -> ProjectedPoint {
    let n = polygon.len();
    let mut area2 = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = polygon[i];
        let q = polygon[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        area2 += cross;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    if area2.abs() < 1e-9 {
        let inv = 1.0 / n as f64;
        return ProjectedPoint::new(
            polygon.iter().map(|p| p.x).sum::<f64>() * inv,
            polygon.iter().map(|p| p.y).sum::<f64>() * inv,
        );
    }
    let factor = 1.0 / (3.0 * area2);
    ProjectedPoint::new(cx * factor, cy * factor)
}

/// Rotate a point around a center by the given angle in degrees
/// (positive = counterclockwise in the planar frame).
pub(crate) fn rotate_about(
    point: ProjectedPoint,
    center: ProjectedPoint,
    angle_deg: f64,
) -> ProjectedPoint {
    let theta = angle_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    ProjectedPoint::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<ProjectedPoint> {
        vec![
            ProjectedPoint::new(0.0, 0.0),
            ProjectedPoint::new(size, 0.0),
            ProjectedPoint::new(size, size),
            ProjectedPoint::new(0.0, size),
        ]
    }

    #[test]
    fn point_in_polygon_square() {
        let poly = square(10.0);
        assert!(point_in_polygon(ProjectedPoint::new(5.0, 5.0), &poly));
        assert!(!point_in_polygon(ProjectedPoint::new(15.0, 5.0), &poly));
        assert!(!point_in_polygon(ProjectedPoint::new(-1.0, -1.0), &poly));
    }

    #[test]
    fn centroid_of_square() {
        let c = polygon_centroid(&square(10.0));
        assert!((c.x - 5.0).abs() < 1e-9);
        assert!((c.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn interpolate_endpoints_and_midpoint() {
        let line = vec![
            ProjectedPoint::new(0.0, 0.0),
            ProjectedPoint::new(10.0, 0.0),
            ProjectedPoint::new(10.0, 10.0),
        ];
        let start = interpolate_along(&line, 0.0);
        let end = interpolate_along(&line, 1.0);
        let mid = interpolate_along(&line, 0.5);
        assert_eq!(start, line[0]);
        assert_eq!(end, line[2]);
        // Halfway along 20m of arc length = the corner.
        assert!((mid.x - 10.0).abs() < 1e-9);
        assert!((mid.y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn rotate_quarter_turn() {
        let p = rotate_about(
            ProjectedPoint::new(1.0, 0.0),
            ProjectedPoint::new(0.0, 0.0),
            90.0,
        );
        assert!((p.x - 0.0).abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_pattern_and_area_is_an_error() {
        let area = AreaDefinition::Orbit {
            center: crate::models::GeoCoordinate::new(-117.0, 33.0),
            radius_m: 50.0,
            orbit_count: 1,
            altitude_step_m: 10.0,
        };
        let flight = test_flight();
        let err = generate_waypoints(&area, &flight, PatternKind::Grid, 0.0).unwrap_err();
        assert!(matches!(err, PlanError::PatternAreaMismatch { .. }));
    }

    pub(crate) fn test_flight() -> FlightParameters {
        FlightParameters {
            altitude_m: 40.0,
            gsd_cm_px: 2.0,
            footprint_width_m: 80.0,
            footprint_height_m: 60.0,
            line_spacing_m: 20.0,
            photo_spacing_m: 15.0,
            max_speed_mps: 7.5,
            photo_interval_s: 2.0,
            estimated_photos: 0,
            estimated_flight_time_min: 0.0,
        }
    }
}
