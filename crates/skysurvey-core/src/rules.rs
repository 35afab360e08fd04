//! Operational limits for generated missions.

use serde::{Deserialize, Serialize};

/// Firmware and regulatory limits a planned mission is checked against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionRules {
    /// Waypoint ceiling per uploaded wayline file
    pub max_waypoints_per_mission: usize,
    /// Fastest shutter cadence at full-sensor 12 MP capture (seconds)
    pub min_photo_interval_12mp_s: f64,
    /// Fastest shutter cadence at 48 MP capture (seconds)
    pub min_photo_interval_48mp_s: f64,
    /// Hard cap on commanded flight speed in meters per second
    pub max_speed_mps: f64,
    /// Maximum allowed altitude in meters
    pub max_altitude_m: f64,
}

impl Default for MissionRules {
    fn default() -> Self {
        Self {
            max_waypoints_per_mission: 99,
            min_photo_interval_12mp_s: 2.0,
            min_photo_interval_48mp_s: 5.0,
            max_speed_mps: 15.0,
            max_altitude_m: 121.0, // FAA Part 107 limit (~400ft)
        }
    }
}

impl MissionRules {
    /// Warning text when a mission exceeds the waypoint ceiling, or `None`
    /// when it fits. Oversized missions still export; the controller splits
    /// them on upload.
    pub fn check_waypoint_budget(&self, waypoint_count: usize) -> Option<String> {
        if waypoint_count > self.max_waypoints_per_mission {
            Some(format!(
                "mission has {waypoint_count} waypoints, above the {} supported per wayline; \
                 it will be split on upload",
                self.max_waypoints_per_mission
            ))
        } else {
            None
        }
    }
}
