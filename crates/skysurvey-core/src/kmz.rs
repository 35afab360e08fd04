//! KMZ mission packaging.
//!
//! The flight controller imports a mission as a KMZ archive, a zip with a
//! fixed layout: `wpmz/template.kml` and `wpmz/waylines.wpml`.

use std::io::{Cursor, Write};

use serde::Serialize;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PlanError;
use crate::models::Mission;
use crate::wpml;

const TEMPLATE_PATH: &str = "wpmz/template.kml";
const WAYLINES_PATH: &str = "wpmz/waylines.wpml";

/// Summary figures for a packaged mission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionStats {
    pub waypoint_count: usize,
    /// Flown path length in meters, including altitude changes
    pub estimated_distance_m: f64,
    pub estimated_photos: usize,
}

/// Build the KMZ archive for a mission, in memory.
pub fn build_mission_package(mission: &Mission) -> Result<Vec<u8>, PlanError> {
    if mission.waypoints.is_empty() {
        return Err(PlanError::EmptyMission);
    }
    let template = wpml::build_template_kml(mission)?;
    let waylines = wpml::build_waylines_wpml(mission)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(TEMPLATE_PATH, options)?;
    writer.write_all(template.as_bytes())?;
    writer.start_file(WAYLINES_PATH, options)?;
    writer.write_all(waylines.as_bytes())?;

    let bytes = writer.finish()?.into_inner();
    info!(
        waypoints = mission.waypoints.len(),
        bytes = bytes.len(),
        "packaged mission archive"
    );
    Ok(bytes)
}

/// Mission summary: waypoint count, 3D path length, and photo stations.
///
/// Distance uses a flat-earth approximation per leg, which is accurate to
/// centimeters at survey scale.
pub fn mission_statistics(mission: &Mission) -> MissionStats {
    let waypoints = &mission.waypoints;
    let estimated_photos = waypoints.iter().filter(|wp| wp.take_photo).count();

    let mut total_distance = 0.0;
    for pair in waypoints.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let lat_diff = (curr.latitude - prev.latitude) * 111_320.0;
        let lon_diff = (curr.longitude - prev.longitude)
            * 111_320.0
            * ((curr.latitude + prev.latitude) / 2.0).to_radians().cos();
        let alt_diff = curr.altitude_m - prev.altitude_m;
        total_distance += (lat_diff * lat_diff + lon_diff * lon_diff + alt_diff * alt_diff).sqrt();
    }

    MissionStats {
        waypoint_count: waypoints.len(),
        estimated_distance_m: (total_distance * 10.0).round() / 10.0,
        estimated_photos,
    }
}
