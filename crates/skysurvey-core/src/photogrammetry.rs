//! Photogrammetric calculations for flight planning.
//!
//! Pure numeric functions over a [`CameraProfile`]. Altitude and GSD are
//! mutually derivable through the same optics equation; values are rounded
//! only when the aggregate [`compute_flight_parameters`] result is built,
//! never mid-pipeline.

use crate::models::{CameraProfile, CaptureMode, FlightParameters, SurveySpec};

/// Flight altitude (m) that produces the target GSD (cm/pixel).
///
/// GSD = (sensor_width * altitude * 100) / (focal_length * image_width)
pub fn altitude_from_gsd(camera: &CameraProfile, gsd_cm: f64) -> f64 {
    (gsd_cm * camera.focal_length_mm * camera.image_width_px as f64)
        / (camera.sensor_width_mm * 100.0)
}

/// GSD (cm/pixel) at a given flight altitude (m). Algebraic inverse of
/// [`altitude_from_gsd`].
pub fn gsd_from_altitude(camera: &CameraProfile, altitude_m: f64) -> f64 {
    (camera.sensor_width_mm * altitude_m * 100.0)
        / (camera.focal_length_mm * camera.image_width_px as f64)
}

/// Ground footprint of a single photo at the given altitude, as
/// (width_m, height_m).
pub fn footprint(camera: &CameraProfile, altitude_m: f64) -> (f64, f64) {
    let width = (camera.sensor_width_mm / camera.focal_length_mm) * altitude_m;
    let height = (camera.sensor_height_mm / camera.focal_length_mm) * altitude_m;
    (width, height)
}

/// Photo spacing (along track) and line spacing (across track) in meters
/// from the overlap requirements.
///
/// Overlap percentages are a caller contract: [50, 95].
pub fn spacing(
    camera: &CameraProfile,
    altitude_m: f64,
    front_overlap_pct: f64,
    side_overlap_pct: f64,
) -> (f64, f64) {
    debug_assert!((50.0..=95.0).contains(&front_overlap_pct));
    debug_assert!((50.0..=95.0).contains(&side_overlap_pct));

    let (footprint_w, footprint_h) = footprint(camera, altitude_m);
    let photo_spacing = footprint_h * (1.0 - front_overlap_pct / 100.0);
    let line_spacing = footprint_w * (1.0 - side_overlap_pct / 100.0);
    (photo_spacing, line_spacing)
}

/// Maximum flight speed (m/s) that keeps consecutive photos at least the
/// camera's minimum interval apart.
pub fn max_speed(camera: &CameraProfile, photo_spacing_m: f64, mode: CaptureMode) -> f64 {
    photo_spacing_m / camera.min_interval_s(mode)
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Compute the full set of flight parameters for a survey.
///
/// When `spec.area_m2` is present the result additionally carries photo
/// count and flight time estimates (20% photo margin, 10% turn margin);
/// both are planning aids, not guarantees.
pub fn compute_flight_parameters(camera: &CameraProfile, spec: &SurveySpec) -> FlightParameters {
    let altitude = spec
        .altitude_override_m
        .unwrap_or_else(|| altitude_from_gsd(camera, spec.target_gsd_cm));
    let actual_gsd = gsd_from_altitude(camera, altitude);
    let (footprint_w, footprint_h) = footprint(camera, altitude);
    let (photo_spacing, line_spacing) = spacing(
        camera,
        altitude,
        spec.front_overlap_pct,
        spec.side_overlap_pct,
    );

    let interval = camera.min_interval_s(spec.capture_mode);
    let raw_max = max_speed(camera, photo_spacing, spec.capture_mode);
    // An override can only slow the aircraft down; the interval-derived
    // maximum is a hard constraint.
    let speed = match spec.speed_override_mps {
        Some(cap) => cap.min(raw_max),
        None => raw_max,
    };

    let (estimated_photos, flight_time_min) = match spec.area_m2 {
        Some(area) if area > 0.0 => {
            let effective_coverage = photo_spacing * line_spacing;
            let photos = (area / effective_coverage * 1.2).ceil() as u32;

            let side_length = area.sqrt();
            let num_lines = side_length / line_spacing;
            let flight_distance = side_length * num_lines * 1.1;
            let flight_time = flight_distance / speed / 60.0;
            (photos, flight_time)
        }
        _ => (0, 0.0),
    };

    FlightParameters {
        altitude_m: round_to(altitude, 1),
        gsd_cm_px: round_to(actual_gsd, 3),
        footprint_width_m: round_to(footprint_w, 2),
        footprint_height_m: round_to(footprint_h, 2),
        line_spacing_m: round_to(line_spacing, 2),
        photo_spacing_m: round_to(photo_spacing, 2),
        max_speed_mps: round_to(speed, 2),
        photo_interval_s: interval,
        estimated_photos,
        estimated_flight_time_min: round_to(flight_time_min, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DroneModel;

    fn test_camera() -> CameraProfile {
        CameraProfile {
            name: "Test".to_string(),
            sensor_width_mm: 10.0,
            sensor_height_mm: 7.5,
            focal_length_mm: 5.0,
            image_width_px: 4000,
            image_height_px: 3000,
            drone_enum_value: 0,
            payload_enum_value: 0,
            min_interval_12mp_s: 2.0,
            min_interval_48mp_s: 5.0,
        }
    }

    #[test]
    fn worked_example_altitude_from_gsd() {
        // 10mm sensor, 5mm focal, 4000px wide, 2.0 cm/px target:
        // (2.0 * 5 * 4000) / (10 * 100) = 40.0 m
        let camera = test_camera();
        let altitude = altitude_from_gsd(&camera, 2.0);
        assert!((altitude - 40.0).abs() < 1e-9);
        let gsd = gsd_from_altitude(&camera, altitude);
        assert!((gsd - 2.0).abs() < 1e-9);
    }

    #[test]
    fn altitude_gsd_round_trip_many_altitudes() {
        let camera = CameraProfile::for_drone(DroneModel::Mini4Pro);
        for altitude in [0.5, 10.0, 40.0, 80.0, 120.0, 500.0] {
            let gsd = gsd_from_altitude(&camera, altitude);
            let back = altitude_from_gsd(&camera, gsd);
            let rel = ((back - altitude) / altitude).abs();
            assert!(rel < 1e-6, "altitude {altitude} -> {back} (rel {rel})");
        }
    }

    #[test]
    fn footprint_scales_with_altitude() {
        let camera = test_camera();
        let (w, h) = footprint(&camera, 40.0);
        assert!((w - 80.0).abs() < 1e-9); // 10/5 * 40
        assert!((h - 60.0).abs() < 1e-9); // 7.5/5 * 40
        let (w2, _) = footprint(&camera, 80.0);
        assert!((w2 - 2.0 * w).abs() < 1e-9);
    }

    #[test]
    fn spacing_from_overlap() {
        let camera = test_camera();
        // Footprint at 40m: 80 x 60.
        let (photo, line) = spacing(&camera, 40.0, 75.0, 65.0);
        assert!((photo - 60.0 * 0.25).abs() < 1e-9);
        assert!((line - 80.0 * 0.35).abs() < 1e-9);
    }

    #[test]
    fn max_speed_uses_capture_mode_interval() {
        let camera = test_camera();
        assert!((max_speed(&camera, 10.0, CaptureMode::Standard12Mp) - 5.0).abs() < 1e-9);
        assert!((max_speed(&camera, 10.0, CaptureMode::HighRes48Mp) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_estimates_present_only_with_area() {
        let camera = test_camera();
        let without_area = compute_flight_parameters(&camera, &SurveySpec::default());
        assert_eq!(without_area.estimated_photos, 0);
        assert_eq!(without_area.estimated_flight_time_min, 0.0);

        let with_area = compute_flight_parameters(
            &camera,
            &SurveySpec {
                area_m2: Some(10_000.0),
                ..SurveySpec::default()
            },
        );
        assert!(with_area.estimated_photos > 0);
        assert!(with_area.estimated_flight_time_min > 0.0);
    }

    #[test]
    fn altitude_override_replaces_gsd_derivation() {
        let camera = test_camera();
        let params = compute_flight_parameters(
            &camera,
            &SurveySpec {
                altitude_override_m: Some(60.0),
                ..SurveySpec::default()
            },
        );
        assert!((params.altitude_m - 60.0).abs() < 1e-9);
        // Reported GSD follows the overridden altitude.
        assert!((params.gsd_cm_px - gsd_from_altitude(&camera, 60.0)).abs() < 0.001);
    }

    #[test]
    fn speed_override_only_lowers_speed() {
        let camera = test_camera();
        let base = compute_flight_parameters(&camera, &SurveySpec::default());
        let capped = compute_flight_parameters(
            &camera,
            &SurveySpec {
                speed_override_mps: Some(1.0),
                ..SurveySpec::default()
            },
        );
        assert!((capped.max_speed_mps - 1.0).abs() < 1e-9);
        let raised = compute_flight_parameters(
            &camera,
            &SurveySpec {
                speed_override_mps: Some(base.max_speed_mps + 100.0),
                ..SurveySpec::default()
            },
        );
        assert_eq!(raised.max_speed_mps, base.max_speed_mps);
    }
}
