//! Grid (serpentine/lawnmower) pattern for survey flights.

use super::{
    point_in_polygon, polygon_centroid, rotate_about, sample_line_waypoints,
};
use crate::models::{FlightParameters, GeoCoordinate, Waypoint};
use crate::projection::{LocalProjection, ProjectedPoint};
use std::f64::consts::FRAC_PI_2;
use tracing::debug;

/// Generate serpentine grid waypoints over a polygon.
///
/// Parallel scan lines spaced by the flight line spacing are laid at
/// `angle_deg` across a span covering the polygon's diagonal (so coverage
/// survives any rotation), clipped to the polygon, ordered by their
/// perpendicular projection, and traversed in alternating directions.
pub fn generate(
    vertices: &[GeoCoordinate],
    flight: &FlightParameters,
    angle_deg: f64,
) -> Vec<Waypoint> {
    if vertices.len() < 3 {
        return Vec::new();
    }
    let Some(projection) = LocalProjection::centered_on(vertices) else {
        return Vec::new();
    };
    let polygon = projection.project_all(vertices);

    let lines = scan_lines(&polygon, flight.line_spacing_m, angle_deg);
    if lines.is_empty() {
        return Vec::new();
    }

    let mut waypoints = Vec::new();
    let mut next_index = 0u32;
    for line in &lines {
        sample_line_waypoints(line, &projection, flight, &mut next_index, &mut waypoints);
    }
    waypoints
}

/// Generate a crosshatch: one grid pass at `angle_deg`, a second at
/// `angle_deg + 90`, concatenated with continued indices.
pub fn generate_double(
    vertices: &[GeoCoordinate],
    flight: &FlightParameters,
    angle_deg: f64,
) -> Vec<Waypoint> {
    if vertices.len() < 3 {
        return Vec::new();
    }
    let mut waypoints = generate(vertices, flight, angle_deg);
    let mut second = generate(vertices, flight, (angle_deg + 90.0) % 360.0);

    let offset = waypoints.len() as u32;
    for wp in &mut second {
        wp.index += offset;
    }
    waypoints.append(&mut second);
    waypoints
}

/// Build the clipped, ordered, serpentine family of scan lines for the
/// polygon. Each returned line is a two-point segment.
fn scan_lines(
    polygon: &[ProjectedPoint],
    line_spacing_m: f64,
    angle_deg: f64,
) -> Vec<Vec<ProjectedPoint>> {
    if line_spacing_m <= 0.0 {
        return Vec::new();
    }

    let (min_x, min_y, max_x, max_y) = bounds(polygon);
    let diagonal = ((max_x - min_x).powi(2) + (max_y - min_y).powi(2)).sqrt();
    if diagonal <= f64::EPSILON {
        return Vec::new();
    }
    let center = polygon_centroid(polygon);

    // Horizontal lines across the full diagonal span, then rotated into
    // the flight direction about the centroid.
    let mut clipped: Vec<(ProjectedPoint, ProjectedPoint)> = Vec::new();
    let mut y = center.y - diagonal;
    while y <= center.y + diagonal {
        let a = rotate_about(
            ProjectedPoint::new(center.x - diagonal, y),
            center,
            -angle_deg,
        );
        let b = rotate_about(
            ProjectedPoint::new(center.x + diagonal, y),
            center,
            -angle_deg,
        );
        if let Some(segment) = clip_to_polygon(a, b, polygon) {
            clipped.push(segment);
        }
        y += line_spacing_m;
    }

    if clipped.is_empty() {
        return Vec::new();
    }

    // Order lines by their projection on the axis perpendicular to the
    // flight direction.
    let perpendicular = angle_deg.to_radians() + FRAC_PI_2;
    let (sin, cos) = perpendicular.sin_cos();
    clipped.sort_by(|a, b| {
        let key = |seg: &(ProjectedPoint, ProjectedPoint)| {
            let mid_x = (seg.0.x + seg.1.x) / 2.0;
            let mid_y = (seg.0.y + seg.1.y) / 2.0;
            mid_x * cos + mid_y * sin
        };
        key(a).total_cmp(&key(b))
    });

    // Serpentine: reverse every other line so consecutive lines connect at
    // adjacent ends.
    clipped
        .into_iter()
        .enumerate()
        .map(|(i, (start, end))| {
            if i % 2 == 1 {
                vec![end, start]
            } else {
                vec![start, end]
            }
        })
        .collect()
}

fn bounds(points: &[ProjectedPoint]) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    (min_x, min_y, max_x, max_y)
}

/// Clip the segment `a`->`b` to the polygon and keep the longest
/// contiguous piece. Smaller fragments of a split intersection are
/// discarded, not merged.
///
/// Both endpoints are assumed to lie outside the polygon (the callers
/// always span the full diagonal), so every entry/exit shows up as an
/// edge crossing.
fn clip_to_polygon(
    a: ProjectedPoint,
    b: ProjectedPoint,
    polygon: &[ProjectedPoint],
) -> Option<(ProjectedPoint, ProjectedPoint)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    let mut crossings: Vec<f64> = Vec::new();
    let n = polygon.len();
    for i in 0..n {
        let p = polygon[i];
        let q = polygon[(i + 1) % n];
        let ex = q.x - p.x;
        let ey = q.y - p.y;
        let denom = dx * ey - dy * ex;
        if denom.abs() < 1e-12 {
            // Parallel to this edge; any overlap is bounded by the
            // crossings with the adjacent edges.
            continue;
        }
        let t = ((p.x - a.x) * ey - (p.y - a.y) * ex) / denom;
        let u = ((p.x - a.x) * dy - (p.y - a.y) * dx) / denom;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            crossings.push(t);
        }
    }

    if crossings.len() < 2 {
        return None;
    }
    crossings.sort_by(f64::total_cmp);
    // A crossing exactly on a shared vertex is reported by both edges.
    crossings.dedup_by(|x, y| (*x - *y).abs() < 1e-9);

    let at = |t: f64| ProjectedPoint::new(a.x + t * dx, a.y + t * dy);

    let mut best: Option<(f64, f64)> = None;
    let mut fragments = 0usize;
    for pair in crossings.windows(2) {
        let (t0, t1) = (pair[0], pair[1]);
        if t1 - t0 < 1e-12 {
            continue;
        }
        let mid = at((t0 + t1) / 2.0);
        if !point_in_polygon(mid, polygon) {
            continue;
        }
        fragments += 1;
        if best.map_or(true, |(b0, b1)| t1 - t0 > b1 - b0) {
            best = Some((t0, t1));
        }
    }
    if fragments > 1 {
        debug!(
            fragments,
            "scan line split by polygon; keeping longest piece"
        );
    }

    best.map(|(t0, t1)| (at(t0), at(t1)))
}
