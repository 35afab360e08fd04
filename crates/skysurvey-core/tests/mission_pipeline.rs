//! End-to-end planning pipeline tests.
//!
//! Exercises the full flow: survey spec -> flight parameters -> waypoint
//! generation -> simplification -> KMZ packaging, then reads the archive
//! back and checks the documents the flight controller will see.

use std::io::{Cursor, Read};

use skysurvey_core::{
    build_mission_package, compute_flight_parameters, generate_waypoints, mission_statistics,
    simplify_waypoints, AreaDefinition, CameraProfile, DroneModel, FinishAction, GeoCoordinate,
    Mission, PatternKind, SimplifyConfig, SurveySpec,
};
use zip::ZipArchive;

/// Roughly 200m x 150m rectangle near San Diego.
fn survey_polygon() -> AreaDefinition {
    AreaDefinition::Polygon {
        vertices: vec![
            GeoCoordinate::new(-117.1500, 32.9000),
            GeoCoordinate::new(-117.1479, 32.9000),
            GeoCoordinate::new(-117.1479, 32.9013),
            GeoCoordinate::new(-117.1500, 32.9013),
        ],
    }
}

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

#[test]
fn grid_survey_plans_simplifies_and_packages() {
    let camera = CameraProfile::for_drone(DroneModel::Mini4Pro);
    let spec = SurveySpec::default();
    let flight = compute_flight_parameters(&camera, &spec);
    assert!(flight.altitude_m > 0.0);
    assert!(flight.line_spacing_m > 0.0);

    let area = survey_polygon();
    let raw = generate_waypoints(&area, &flight, PatternKind::Grid, 0.0).unwrap();
    assert!(raw.len() > 4, "grid produced {} waypoints", raw.len());

    let (simplified, stats) = simplify_waypoints(&raw, &SimplifyConfig::default());
    assert_eq!(stats.original_count, raw.len());
    assert!(stats.simplified_count <= stats.original_count);
    // Straight line interiors collapse; the turns at line ends survive.
    assert!(simplified.len() >= 4);
    for (i, wp) in simplified.iter().enumerate() {
        assert_eq!(wp.index, i as u32);
    }

    let mission = Mission {
        name: Some("pipeline survey".into()),
        drone_model: DroneModel::Mini4Pro,
        waypoints: simplified,
        finish_action: FinishAction::GoHome,
    };
    let bytes = build_mission_package(&mission).unwrap();

    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);
    let template = read_entry(&mut archive, "wpmz/template.kml");
    let waylines = read_entry(&mut archive, "wpmz/waylines.wpml");

    assert!(template.contains("<wpml:author>SkySurvey Planner</wpml:author>"));
    assert!(template.contains("<wpml:finishAction>goHome</wpml:finishAction>"));
    assert!(!template.contains("<Placemark>"));

    let placemarks = waylines.matches("<Placemark>").count();
    assert_eq!(placemarks, mission.waypoints.len());
    // Firmware compatibility rules hold on the real document.
    assert!(!waylines.contains("<wpml:useGlobalSpeed>"));
    assert_eq!(waylines.matches("takePhoto").count(), 1);
    assert_eq!(
        waylines
            .matches("<wpml:useStraightLine>0</wpml:useStraightLine>")
            .count(),
        placemarks
    );
    for height in waylines
        .split("<wpml:executeHeight>")
        .skip(1)
        .map(|rest| rest.split('<').next().unwrap())
    {
        assert!(
            !height.contains('.'),
            "executeHeight must be an integer, got {height}"
        );
    }
}

#[test]
fn orbit_survey_packages_with_climbing_rings() {
    let camera = CameraProfile::for_drone(DroneModel::Mini5Pro);
    let flight = compute_flight_parameters(&camera, &SurveySpec::default());
    let area = AreaDefinition::Orbit {
        center: GeoCoordinate::new(-117.1490, 32.9006),
        radius_m: 60.0,
        orbit_count: 2,
        altitude_step_m: 15.0,
    };
    let waypoints = generate_waypoints(&area, &flight, PatternKind::Orbit, 0.0).unwrap();
    assert_eq!(waypoints.len(), 72);
    assert!(waypoints[36].altitude_m > waypoints[0].altitude_m);

    let mission = Mission {
        name: None,
        drone_model: DroneModel::Mini5Pro,
        waypoints,
        finish_action: FinishAction::NoAction,
    };
    let stats = mission_statistics(&mission);
    assert_eq!(stats.waypoint_count, 72);
    assert!(stats.estimated_distance_m > 0.0);

    let bytes = build_mission_package(&mission).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let template = read_entry(&mut archive, "wpmz/template.kml");
    assert!(template.contains("<wpml:droneEnumValue>91</wpml:droneEnumValue>"));
    assert!(template.contains("<wpml:finishAction>noAction</wpml:finishAction>"));
}

#[test]
fn pattern_and_area_must_agree() {
    let camera = CameraProfile::for_drone(DroneModel::Mini4Pro);
    let flight = compute_flight_parameters(&camera, &SurveySpec::default());
    let area = AreaDefinition::Orbit {
        center: GeoCoordinate::new(-117.0, 33.0),
        radius_m: 50.0,
        orbit_count: 1,
        altitude_step_m: 10.0,
    };
    let err = generate_waypoints(&area, &flight, PatternKind::Grid, 0.0).unwrap_err();
    assert!(err.to_string().contains("Grid"), "{err}");
    assert!(err.to_string().contains("orbit"), "{err}");
}
