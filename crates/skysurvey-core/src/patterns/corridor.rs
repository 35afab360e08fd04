//! Corridor pattern for linear features (roads, rivers, pipelines).

use super::sample_line_waypoints;
use crate::models::{FlightParameters, GeoCoordinate, Waypoint};
use crate::projection::{LocalProjection, ProjectedPoint};
use tracing::debug;

const MAX_LINE_COUNT: u8 = 5;
/// The centerline is extended past the surveyed feature by this many line
/// spacings at each end, so capture coverage reaches the area edges.
const END_EXTENSION_SPACINGS: f64 = 2.0;
/// Miter joins longer than this multiple of the offset distance collapse
/// to a bevel to avoid spikes at sharp vertices.
const MITER_LIMIT: f64 = 8.0;

/// Generate corridor waypoints from an explicit centerline.
///
/// `line_count` parallel offset lines are distributed evenly across the
/// corridor width and flown serpentine. A line whose offset degenerates is
/// skipped; the rest of the corridor still flies.
pub fn from_centerline(
    centerline: &[GeoCoordinate],
    width_m: f64,
    line_count: u8,
    flight: &FlightParameters,
) -> Vec<Waypoint> {
    if centerline.len() < 2 {
        return Vec::new();
    }
    let line_count = line_count.clamp(1, MAX_LINE_COUNT);

    let Some(projection) = LocalProjection::centered_on(centerline) else {
        return Vec::new();
    };
    let mut center: Vec<ProjectedPoint> = projection.project_all(centerline);
    dedup_consecutive(&mut center);
    if center.len() < 2 {
        return Vec::new();
    }
    extend_ends(&mut center, END_EXTENSION_SPACINGS * flight.line_spacing_m);

    let offsets = line_offsets(width_m, line_count);

    let mut waypoints = Vec::new();
    let mut next_index = 0u32;
    for (i, offset) in offsets.iter().enumerate() {
        let mut line = if offset.abs() < f64::EPSILON {
            center.clone()
        } else {
            match offset_polyline(&center, *offset) {
                Some(line) => line,
                None => {
                    debug!(offset, "skipping degenerate corridor offset line");
                    continue;
                }
            }
        };
        // Serpentine by offset index so a skipped line does not flip the
        // direction of the ones after it.
        if i % 2 == 1 {
            line.reverse();
        }
        sample_line_waypoints(&line, &projection, flight, &mut next_index, &mut waypoints);
    }
    waypoints
}

/// Generate corridor waypoints from a polygon.
///
/// The polygon's minimum-area oriented bounding rectangle supplies the
/// corridor axis: the centerline joins the midpoints of the rectangle's
/// two short edges and the corridor width is the short-edge length.
pub fn from_polygon(vertices: &[GeoCoordinate], flight: &FlightParameters) -> Vec<Waypoint> {
    const DEFAULT_LINE_COUNT: u8 = 3;

    if vertices.len() < 3 {
        return Vec::new();
    }
    let Some(projection) = LocalProjection::centered_on(vertices) else {
        return Vec::new();
    };
    let points = projection.project_all(vertices);
    let Some(rect) = min_area_rect(&points) else {
        return Vec::new();
    };

    let centerline = [
        projection.unproject(rect.axis_start),
        projection.unproject(rect.axis_end),
    ];
    from_centerline(&centerline, rect.width_m, DEFAULT_LINE_COUNT, flight)
}

fn dedup_consecutive(points: &mut Vec<ProjectedPoint>) {
    points.dedup_by(|a, b| a.distance_to(b) < 1e-9);
}

fn line_offsets(width_m: f64, line_count: u8) -> Vec<f64> {
    if line_count == 1 {
        return vec![0.0];
    }
    let half = width_m / 2.0;
    let step = width_m / (line_count - 1) as f64;
    (0..line_count).map(|i| -half + i as f64 * step).collect()
}

/// Push the first and last vertex outward along their segment directions.
fn extend_ends(points: &mut [ProjectedPoint], extension_m: f64) {
    if points.len() < 2 || extension_m <= 0.0 {
        return;
    }
    let n = points.len();
    if let Some(dir) = unit_direction(points[1], points[0]) {
        points[0] = ProjectedPoint::new(
            points[0].x + dir.0 * extension_m,
            points[0].y + dir.1 * extension_m,
        );
    }
    if let Some(dir) = unit_direction(points[n - 2], points[n - 1]) {
        points[n - 1] = ProjectedPoint::new(
            points[n - 1].x + dir.0 * extension_m,
            points[n - 1].y + dir.1 * extension_m,
        );
    }
}

fn unit_direction(from: ProjectedPoint, to: ProjectedPoint) -> Option<(f64, f64)> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-9 {
        return None;
    }
    Some((dx / len, dy / len))
}

/// Offset a polyline perpendicular to its direction of travel; positive
/// offsets go left. Joints between segments are mitered, falling back to
/// a bevel at sharp vertices. Returns `None` when the geometry collapses.
fn offset_polyline(points: &[ProjectedPoint], offset_m: f64) -> Option<Vec<ProjectedPoint>> {
    // Offset each segment individually.
    let mut segments: Vec<(ProjectedPoint, ProjectedPoint)> = Vec::new();
    for pair in points.windows(2) {
        let Some((dx, dy)) = unit_direction(pair[0], pair[1]) else {
            continue;
        };
        // Left normal of (dx, dy).
        let (nx, ny) = (-dy, dx);
        segments.push((
            ProjectedPoint::new(pair[0].x + nx * offset_m, pair[0].y + ny * offset_m),
            ProjectedPoint::new(pair[1].x + nx * offset_m, pair[1].y + ny * offset_m),
        ));
    }
    if segments.is_empty() {
        return None;
    }

    let mut result = vec![segments[0].0];
    for pair in segments.windows(2) {
        let (a1, a2) = pair[0];
        let (b1, b2) = pair[1];
        match line_intersection(a1, a2, b1, b2) {
            Some(joint)
                if joint.distance_to(&a2) <= MITER_LIMIT * offset_m.abs() + 1.0 =>
            {
                result.push(joint);
            }
            _ => {
                // Bevel: keep both segment ends at the vertex.
                result.push(a2);
                result.push(b1);
            }
        }
    }
    result.push(segments[segments.len() - 1].1);

    dedup_consecutive(&mut result);
    if result.len() < 2 || super::polyline_length(&result) < 1e-6 {
        return None;
    }
    Some(result)
}

/// Intersection of the infinite lines through (a1,a2) and (b1,b2).
fn line_intersection(
    a1: ProjectedPoint,
    a2: ProjectedPoint,
    b1: ProjectedPoint,
    b2: ProjectedPoint,
) -> Option<ProjectedPoint> {
    let d1x = a2.x - a1.x;
    let d1y = a2.y - a1.y;
    let d2x = b2.x - b1.x;
    let d2y = b2.y - b1.y;
    let denom = d1x * d2y - d1y * d2x;
    if denom.abs() < 1e-9 {
        return None;
    }
    let t = ((b1.x - a1.x) * d2y - (b1.y - a1.y) * d2x) / denom;
    Some(ProjectedPoint::new(a1.x + t * d1x, a1.y + t * d1y))
}

struct OrientedRect {
    /// Midpoint of one short edge
    axis_start: ProjectedPoint,
    /// Midpoint of the opposite short edge
    axis_end: ProjectedPoint,
    /// Short-edge length
    width_m: f64,
}

/// Minimum-area oriented bounding rectangle via edge rotation over the
/// convex hull.
fn min_area_rect(points: &[ProjectedPoint]) -> Option<OrientedRect> {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return None;
    }

    let mut best: Option<(f64, f64, f64, f64, f64, f64)> = None; // area, theta, bounds
    for i in 0..hull.len() {
        let p = hull[i];
        let q = hull[(i + 1) % hull.len()];
        let theta = (q.y - p.y).atan2(q.x - p.x);
        let (sin, cos) = theta.sin_cos();

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for h in &hull {
            // Rotate by -theta so the candidate edge lies along x.
            let x = h.x * cos + h.y * sin;
            let y = -h.x * sin + h.y * cos;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        let area = (max_x - min_x) * (max_y - min_y);
        if best.map_or(true, |(a, ..)| area < a) {
            best = Some((area, theta, min_x, max_x, min_y, max_y));
        }
    }

    let (_, theta, min_x, max_x, min_y, max_y) = best?;
    let (sin, cos) = theta.sin_cos();
    let back = |x: f64, y: f64| ProjectedPoint::new(x * cos - y * sin, x * sin + y * cos);

    let extent_x = max_x - min_x;
    let extent_y = max_y - min_y;
    let mid_x = (min_x + max_x) / 2.0;
    let mid_y = (min_y + max_y) / 2.0;

    // The centerline runs along the long axis, joining the midpoints of
    // the two short edges.
    let rect = if extent_x >= extent_y {
        OrientedRect {
            axis_start: back(min_x, mid_y),
            axis_end: back(max_x, mid_y),
            width_m: extent_y,
        }
    } else {
        OrientedRect {
            axis_start: back(mid_x, min_y),
            axis_end: back(mid_x, max_y),
            width_m: extent_x,
        }
    };
    if rect.axis_start.distance_to(&rect.axis_end) < 1e-6 {
        return None;
    }
    Some(rect)
}

/// Andrew's monotone chain; returns the hull counterclockwise without the
/// closing point.
fn convex_hull(points: &[ProjectedPoint]) -> Vec<ProjectedPoint> {
    let mut sorted: Vec<ProjectedPoint> = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup_by(|a, b| a.distance_to(b) < 1e-9);
    if sorted.len() < 3 {
        return sorted;
    }

    let cross = |o: ProjectedPoint, a: ProjectedPoint, b: ProjectedPoint| {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };

    let mut lower: Vec<ProjectedPoint> = Vec::new();
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<ProjectedPoint> = Vec::new();
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}
