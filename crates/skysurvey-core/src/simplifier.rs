//! Waypoint reduction for dense survey lines.
//!
//! Firmware limits how many waypoints a wayline may carry, but survey lines
//! are straight: interior stations add nothing the controller needs as long
//! as the camera keeps firing on its interval timer. The simplifier keeps
//! turns and re-seeds a waypoint whenever too much distance would pass
//! without one, so the drone never flies a long leg blind.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Waypoint;
use crate::projection::haversine_distance;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifyConfig {
    pub enabled: bool,
    /// Heading change at a waypoint that marks it as a turn (degrees)
    pub angle_threshold_deg: f64,
    /// Longest leg allowed without a waypoint (meters)
    pub max_distance_between_m: Option<f64>,
    /// Longest leg allowed without a waypoint, expressed as flight time.
    /// Takes precedence over the distance cap when both are set.
    pub max_time_between_s: Option<f64>,
    /// Speed assumed for the time cap when a waypoint carries none
    pub fallback_speed_mps: f64,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            angle_threshold_deg: 5.0,
            max_distance_between_m: None,
            max_time_between_s: None,
            fallback_speed_mps: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifyStats {
    pub original_count: usize,
    pub simplified_count: usize,
    pub reduction_percent: f64,
    pub enabled: bool,
}

/// Reduce a waypoint sequence to its turns plus distance re-seeds.
///
/// The first and last waypoint always survive, and the survivors keep
/// their original order with indices rewritten to be contiguous again.
pub fn simplify_waypoints(
    waypoints: &[Waypoint],
    config: &SimplifyConfig,
) -> (Vec<Waypoint>, SimplifyStats) {
    let original_count = waypoints.len();
    if !config.enabled || original_count <= 2 {
        let stats = SimplifyStats {
            original_count,
            simplified_count: original_count,
            reduction_percent: 0.0,
            enabled: config.enabled,
        };
        return (waypoints.to_vec(), stats);
    }

    let mut critical: BTreeSet<usize> = BTreeSet::new();
    critical.insert(0);
    critical.insert(original_count - 1);

    // A heading change marks both the waypoint entering the turn and the
    // one leaving it, so the flown corner matches the planned one.
    for i in 1..original_count {
        if heading_delta(waypoints[i - 1].heading_deg, waypoints[i].heading_deg)
            >= config.angle_threshold_deg
        {
            critical.insert(i - 1);
            critical.insert(i);
        }
    }

    // Re-seed a waypoint whenever the distance since the last survivor
    // exceeds the cap. The cap is measured along the raw path, not the
    // straight line, so zig-zag segments are not undercounted.
    let mut accumulated = 0.0;
    let mut run_start = 0usize;
    let mut reseeds: Vec<usize> = Vec::new();
    for i in 1..original_count {
        let prev = &waypoints[i - 1];
        let next = &waypoints[i];
        accumulated +=
            haversine_distance(prev.latitude, prev.longitude, next.latitude, next.longitude);

        if critical.contains(&i) {
            accumulated = 0.0;
            run_start = i;
        } else if let Some(cap) = distance_cap(config, &waypoints[run_start]) {
            if accumulated >= cap {
                reseeds.push(i);
                accumulated = 0.0;
                run_start = i;
            }
        }
    }
    critical.extend(reseeds);

    let simplified: Vec<Waypoint> = critical
        .iter()
        .enumerate()
        .map(|(new_index, &i)| {
            let mut wp = waypoints[i].clone();
            wp.index = new_index as u32;
            wp
        })
        .collect();

    let simplified_count = simplified.len();
    let reduction_percent = ((1.0 - simplified_count as f64 / original_count as f64) * 1000.0)
        .round()
        / 10.0;
    debug!(
        original = original_count,
        simplified = simplified_count,
        reduction_percent,
        "simplified waypoint sequence"
    );

    let stats = SimplifyStats {
        original_count,
        simplified_count,
        reduction_percent,
        enabled: true,
    };
    (simplified, stats)
}

/// Smallest rotation between two headings, in [0, 180].
fn heading_delta(a_deg: f64, b_deg: f64) -> f64 {
    let diff = (a_deg - b_deg).abs() % 360.0;
    diff.min(360.0 - diff)
}

/// Distance cap for the run starting at `start`, if any cap is configured.
fn distance_cap(config: &SimplifyConfig, start: &Waypoint) -> Option<f64> {
    if let Some(max_time) = config.max_time_between_s {
        let speed = if start.speed_mps > 0.0 {
            start.speed_mps
        } else {
            config.fallback_speed_mps
        };
        return Some(max_time * speed);
    }
    config.max_distance_between_m
}
