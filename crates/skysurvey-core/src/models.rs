//! Core data models for survey mission planning.

use serde::{Deserialize, Serialize};

/// Supported drone models with built-in camera presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroneModel {
    Mini4Pro,
    Mini5Pro,
}

/// Flight pattern selected for a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Serpentine parallel lines over a polygon
    Grid,
    /// Two grid passes rotated 90 degrees apart (crosshatch)
    DoubleGrid,
    /// Parallel lines along a linear feature
    Corridor,
    /// Concentric rings around a point of interest
    Orbit,
}

/// Action the aircraft performs when the wayline finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinishAction {
    GoHome,
    NoAction,
    AutoLand,
    GotoFirstWaypoint,
}

impl FinishAction {
    /// Firmware wire value for the mission config element.
    pub fn as_wpml(&self) -> &'static str {
        match self {
            FinishAction::GoHome => "goHome",
            FinishAction::NoAction => "noAction",
            FinishAction::AutoLand => "autoLand",
            FinishAction::GotoFirstWaypoint => "gotoFirstWaypoint",
        }
    }
}

/// Still-capture mode; the slower 48 MP mode needs a longer photo interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    #[default]
    Standard12Mp,
    HighRes48Mp,
}

/// Camera/sensor specification for a drone model.
///
/// Looked up once per request by [`CameraProfile::for_drone`] and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraProfile {
    pub name: String,
    pub sensor_width_mm: f64,
    pub sensor_height_mm: f64,
    pub focal_length_mm: f64,
    pub image_width_px: u32,
    pub image_height_px: u32,
    /// Firmware numeric code identifying the drone model
    pub drone_enum_value: u32,
    /// Firmware numeric code identifying the camera payload
    pub payload_enum_value: u32,
    /// Minimum photo interval in 12 MP mode (seconds)
    pub min_interval_12mp_s: f64,
    /// Minimum photo interval in 48 MP mode (seconds)
    pub min_interval_48mp_s: f64,
}

impl CameraProfile {
    /// Built-in preset for a supported drone model.
    pub fn for_drone(model: DroneModel) -> Self {
        match model {
            DroneModel::Mini4Pro => Self {
                name: "DJI Mini 4 Pro".to_string(),
                sensor_width_mm: 9.59,
                sensor_height_mm: 7.19,
                focal_length_mm: 6.72,
                image_width_px: 8064,
                image_height_px: 6048,
                drone_enum_value: 68,
                payload_enum_value: 52,
                min_interval_12mp_s: 2.0,
                min_interval_48mp_s: 5.0,
            },
            DroneModel::Mini5Pro => Self {
                name: "DJI Mini 5 Pro".to_string(),
                sensor_width_mm: 9.59,
                sensor_height_mm: 7.19,
                focal_length_mm: 6.72,
                image_width_px: 8064,
                image_height_px: 6048,
                drone_enum_value: 91,
                payload_enum_value: 80,
                min_interval_12mp_s: 2.0,
                min_interval_48mp_s: 5.0,
            },
        }
    }

    /// Minimum photo interval for the given capture mode (seconds).
    pub fn min_interval_s(&self, mode: CaptureMode) -> f64 {
        match mode {
            CaptureMode::Standard12Mp => self.min_interval_12mp_s,
            CaptureMode::HighRes48Mp => self.min_interval_48mp_s,
        }
    }
}

/// Geographic coordinate in WGS84 decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Longitude in degrees, [-180, 180]
    pub longitude: f64,
    /// Latitude in degrees, [-90, 90]
    pub latitude: f64,
}

impl GeoCoordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// A single waypoint in the flight path.
///
/// `index` equals the waypoint's position in the emitted sequence; the
/// sequence is never reordered after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub index: u32,
    pub longitude: f64,
    pub latitude: f64,
    /// Relative altitude in meters (AGL)
    pub altitude_m: f64,
    /// Heading in degrees from north, [0, 360)
    pub heading_deg: f64,
    /// Gimbal pitch angle in degrees, [-90, 0]; -90 is nadir
    pub gimbal_pitch_deg: f64,
    /// Speed in m/s
    pub speed_mps: f64,
    /// Whether a photo is captured at this waypoint
    pub take_photo: bool,
}

/// Calculated flight parameters for a survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightParameters {
    /// Flight altitude in meters AGL
    pub altitude_m: f64,
    /// Ground Sample Distance in cm/pixel
    pub gsd_cm_px: f64,
    /// Image footprint width in meters
    pub footprint_width_m: f64,
    /// Image footprint height in meters
    pub footprint_height_m: f64,
    /// Spacing between flight lines in meters
    pub line_spacing_m: f64,
    /// Spacing between photos along a line in meters
    pub photo_spacing_m: f64,
    /// Maximum speed that still honors the photo interval
    pub max_speed_mps: f64,
    /// Photo interval in seconds
    pub photo_interval_s: f64,
    /// Estimated number of photos (planning aid, not a guarantee)
    pub estimated_photos: u32,
    /// Estimated flight time in minutes (planning aid)
    pub estimated_flight_time_min: f64,
}

/// User-chosen photogrammetric requirements for a survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySpec {
    /// Target Ground Sample Distance in cm/pixel
    pub target_gsd_cm: f64,
    /// Forward overlap percentage, [50, 95]
    pub front_overlap_pct: f64,
    /// Side overlap percentage, [50, 95]
    pub side_overlap_pct: f64,
    #[serde(default)]
    pub capture_mode: CaptureMode,
    /// Optional surveyed area for photo/time estimates (m^2)
    #[serde(default)]
    pub area_m2: Option<f64>,
    /// Fly at this altitude instead of the GSD-derived one
    #[serde(default)]
    pub altitude_override_m: Option<f64>,
    /// Cap the flight speed below the interval-derived maximum
    #[serde(default)]
    pub speed_override_mps: Option<f64>,
}

impl Default for SurveySpec {
    fn default() -> Self {
        Self {
            target_gsd_cm: 2.0,
            front_overlap_pct: 75.0,
            side_overlap_pct: 65.0,
            capture_mode: CaptureMode::Standard12Mp,
            area_m2: None,
            altitude_override_m: None,
            speed_override_mps: None,
        }
    }
}

/// Surveyed ground area; exactly one variant is supplied per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AreaDefinition {
    /// Closed polygon, at least 3 vertices
    Polygon { vertices: Vec<GeoCoordinate> },
    /// Linear corridor around a centerline, at least 2 points
    Corridor {
        centerline: Vec<GeoCoordinate>,
        width_m: f64,
        /// Number of parallel lines, [1, 5]
        line_count: u8,
    },
    /// Concentric orbits around a point of interest
    Orbit {
        center: GeoCoordinate,
        radius_m: f64,
        /// Number of concentric orbits, [1, 5]
        orbit_count: u8,
        /// Altitude increase between orbits in meters
        altitude_step_m: f64,
    },
}

impl AreaDefinition {
    /// Short name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AreaDefinition::Polygon { .. } => "polygon",
            AreaDefinition::Corridor { .. } => "corridor",
            AreaDefinition::Orbit { .. } => "orbit",
        }
    }
}

/// A fully assembled mission, ready to serialize exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub name: Option<String>,
    pub drone_model: DroneModel,
    pub waypoints: Vec<Waypoint>,
    pub finish_action: FinishAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_presets_expose_firmware_codes() {
        let mini4 = CameraProfile::for_drone(DroneModel::Mini4Pro);
        assert_eq!(mini4.drone_enum_value, 68);
        assert_eq!(mini4.payload_enum_value, 52);

        let mini5 = CameraProfile::for_drone(DroneModel::Mini5Pro);
        assert_eq!(mini5.drone_enum_value, 91);
        assert_eq!(mini5.payload_enum_value, 80);
    }

    #[test]
    fn capture_mode_selects_interval() {
        let camera = CameraProfile::for_drone(DroneModel::Mini4Pro);
        assert_eq!(camera.min_interval_s(CaptureMode::Standard12Mp), 2.0);
        assert_eq!(camera.min_interval_s(CaptureMode::HighRes48Mp), 5.0);
    }

    #[test]
    fn area_definition_round_trips_through_json() {
        let area = AreaDefinition::Corridor {
            centerline: vec![
                GeoCoordinate::new(-117.0, 33.0),
                GeoCoordinate::new(-116.99, 33.0),
            ],
            width_m: 80.0,
            line_count: 3,
        };
        let json = serde_json::to_string(&area).unwrap();
        assert!(json.contains("\"type\":\"corridor\""));
        let back: AreaDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind_name(), "corridor");
    }

    #[test]
    fn finish_action_wire_values() {
        assert_eq!(FinishAction::GoHome.as_wpml(), "goHome");
        assert_eq!(FinishAction::GotoFirstWaypoint.as_wpml(), "gotoFirstWaypoint");
        let json = serde_json::to_string(&FinishAction::AutoLand).unwrap();
        assert_eq!(json, "\"autoLand\"");
    }
}
