pub mod error;
pub mod kmz;
pub mod models;
pub mod patterns;
pub mod photogrammetry;
pub mod projection;
pub mod rules;
pub mod simplifier;
pub mod wpml;

pub use error::PlanError;
pub use kmz::{build_mission_package, mission_statistics, MissionStats};
pub use models::{
    AreaDefinition, CameraProfile, CaptureMode, DroneModel, FinishAction, FlightParameters,
    GeoCoordinate, Mission, PatternKind, SurveySpec, Waypoint,
};
pub use patterns::{generate_waypoints, DEFAULT_PHOTOS_PER_ORBIT, START_GIMBAL_PITCH_DEG};
pub use photogrammetry::compute_flight_parameters;
pub use projection::{haversine_distance, heading_between, LocalProjection, ProjectedPoint};
pub use rules::MissionRules;
pub use simplifier::{simplify_waypoints, SimplifyConfig, SimplifyStats};
pub use wpml::{build_template_kml, build_waylines_wpml};
