//! WPML document generation.
//!
//! A mission package carries two XML documents. `template.kml` holds mission
//! metadata and the shared mission config; `waylines.wpml` holds the
//! executable waypoint list with its action groups. Both use the KML 2.2
//! namespace plus the WPML extension namespace.
//!
//! The flight-controller firmware is picky about details the file format
//! leaves open: `executeHeight` must be an integer, `useStraightLine` must
//! be 0, `waypointHeadingAngle` and `waypointGimbalPitchAngle` must be 0
//! (heading comes from `followWayline`, pitch from the gimbal actions), the
//! shutter runs on its interval timer so `takePhoto` appears only at the
//! first waypoint, and the transit `gimbalEvenlyRotate` actions must carry
//! the real pitch target rather than 0. Everything here conforms to that
//! rule set.

use std::fmt::Write;

use chrono::Utc;

use crate::error::PlanError;
use crate::models::{CameraProfile, Mission};

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
pub const WPML_NAMESPACE: &str = "http://www.uav.com/wpmz/1.0.2";

const AUTHOR: &str = "SkySurvey Planner";
const DEFAULT_TRANSITIONAL_SPEED_MPS: f64 = 5.0;

/// Render `template.kml` for a mission.
pub fn build_template_kml(mission: &Mission) -> Result<String, PlanError> {
    build_template_kml_at(mission, Utc::now().timestamp_millis())
}

fn build_template_kml_at(mission: &Mission, timestamp_ms: i64) -> Result<String, PlanError> {
    if mission.waypoints.is_empty() {
        return Err(PlanError::EmptyMission);
    }
    let camera = CameraProfile::for_drone(mission.drone_model);

    let mut doc = String::new();
    doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        doc,
        "<kml xmlns=\"{KML_NAMESPACE}\" xmlns:wpml=\"{WPML_NAMESPACE}\">"
    );
    doc.push_str("  <Document>\n");
    let _ = writeln!(doc, "    <wpml:author>{AUTHOR}</wpml:author>");
    let _ = writeln!(doc, "    <wpml:createTime>{timestamp_ms}</wpml:createTime>");
    let _ = writeln!(doc, "    <wpml:updateTime>{timestamp_ms}</wpml:updateTime>");
    doc.push_str(&mission_config(mission, &camera));
    doc.push_str("  </Document>\n");
    doc.push_str("</kml>\n");
    Ok(doc)
}

/// Render `waylines.wpml` for a mission.
pub fn build_waylines_wpml(mission: &Mission) -> Result<String, PlanError> {
    if mission.waypoints.is_empty() {
        return Err(PlanError::EmptyMission);
    }
    let camera = CameraProfile::for_drone(mission.drone_model);
    let speed = transitional_speed(mission);

    let mut doc = String::new();
    doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        doc,
        "<kml xmlns=\"{KML_NAMESPACE}\" xmlns:wpml=\"{WPML_NAMESPACE}\">"
    );
    doc.push_str("  <Document>\n");
    doc.push_str(&mission_config(mission, &camera));
    doc.push_str("    <Folder>\n");
    doc.push_str("      <wpml:templateId>0</wpml:templateId>\n");
    doc.push_str("      <wpml:executeHeightMode>relativeToStartPoint</wpml:executeHeightMode>\n");
    doc.push_str("      <wpml:waylineId>0</wpml:waylineId>\n");
    doc.push_str("      <wpml:distance>0</wpml:distance>\n");
    doc.push_str("      <wpml:duration>0</wpml:duration>\n");
    let _ = writeln!(doc, "      <wpml:autoFlightSpeed>{speed}</wpml:autoFlightSpeed>");

    // Action ids are unique across the whole document, starting at 1.
    let mut next_action_id = 1u32;
    let last = mission.waypoints.len() - 1;
    for i in 0..mission.waypoints.len() {
        doc.push_str(&placemark(mission, i, i == 0, i == last, &mut next_action_id));
    }

    doc.push_str("    </Folder>\n");
    doc.push_str("  </Document>\n");
    doc.push_str("</kml>\n");
    Ok(doc)
}

fn transitional_speed(mission: &Mission) -> f64 {
    mission
        .waypoints
        .first()
        .map(|wp| wp.speed_mps)
        .unwrap_or(DEFAULT_TRANSITIONAL_SPEED_MPS)
}

/// `missionConfig` block shared by both documents. The finish action is the
/// mission's in both, so what the controller previews matches what it flies.
fn mission_config(mission: &Mission, camera: &CameraProfile) -> String {
    let speed = transitional_speed(mission);
    let mut xml = String::new();
    xml.push_str("    <wpml:missionConfig>\n");
    xml.push_str("      <wpml:flyToWaylineMode>safely</wpml:flyToWaylineMode>\n");
    let _ = writeln!(
        xml,
        "      <wpml:finishAction>{}</wpml:finishAction>",
        mission.finish_action.as_wpml()
    );
    xml.push_str("      <wpml:exitOnRCLost>executeLostAction</wpml:exitOnRCLost>\n");
    xml.push_str("      <wpml:executeRCLostAction>goBack</wpml:executeRCLostAction>\n");
    let _ = writeln!(
        xml,
        "      <wpml:globalTransitionalSpeed>{speed}</wpml:globalTransitionalSpeed>"
    );
    xml.push_str("      <wpml:droneInfo>\n");
    let _ = writeln!(
        xml,
        "        <wpml:droneEnumValue>{}</wpml:droneEnumValue>",
        camera.drone_enum_value
    );
    xml.push_str("        <wpml:droneSubEnumValue>0</wpml:droneSubEnumValue>\n");
    xml.push_str("      </wpml:droneInfo>\n");
    xml.push_str("    </wpml:missionConfig>\n");
    xml
}

fn placemark(
    mission: &Mission,
    i: usize,
    is_first: bool,
    is_last: bool,
    next_action_id: &mut u32,
) -> String {
    let wp = &mission.waypoints[i];
    let turn_mode = if is_first || is_last {
        "toPointAndStopWithContinuityCurvature"
    } else {
        "toPointAndPassWithContinuityCurvature"
    };
    let heading_angle_enable = if is_first || is_last { 1 } else { 0 };

    let mut xml = String::new();
    xml.push_str("      <Placemark>\n");
    xml.push_str("        <Point>\n");
    xml.push_str("          <coordinates>\n");
    let _ = writeln!(xml, "            {},{}", wp.longitude, wp.latitude);
    xml.push_str("          </coordinates>\n");
    xml.push_str("        </Point>\n");
    let _ = writeln!(xml, "        <wpml:index>{}</wpml:index>", wp.index);
    let _ = writeln!(
        xml,
        "        <wpml:executeHeight>{}</wpml:executeHeight>",
        wp.altitude_m.round() as i64
    );
    let _ = writeln!(
        xml,
        "        <wpml:waypointSpeed>{}</wpml:waypointSpeed>",
        wp.speed_mps
    );
    xml.push_str("        <wpml:waypointHeadingParam>\n");
    xml.push_str("          <wpml:waypointHeadingMode>followWayline</wpml:waypointHeadingMode>\n");
    xml.push_str("          <wpml:waypointHeadingAngle>0</wpml:waypointHeadingAngle>\n");
    xml.push_str(
        "          <wpml:waypointPoiPoint>0.000000,0.000000,0.000000</wpml:waypointPoiPoint>\n",
    );
    let _ = writeln!(
        xml,
        "          <wpml:waypointHeadingAngleEnable>{heading_angle_enable}</wpml:waypointHeadingAngleEnable>"
    );
    xml.push_str("          <wpml:waypointHeadingPathMode>followBadArc</wpml:waypointHeadingPathMode>\n");
    xml.push_str("          <wpml:waypointHeadingPoiIndex>0</wpml:waypointHeadingPoiIndex>\n");
    xml.push_str("        </wpml:waypointHeadingParam>\n");
    xml.push_str("        <wpml:waypointTurnParam>\n");
    let _ = writeln!(
        xml,
        "          <wpml:waypointTurnMode>{turn_mode}</wpml:waypointTurnMode>"
    );
    xml.push_str("          <wpml:waypointTurnDampingDist>0</wpml:waypointTurnDampingDist>\n");
    xml.push_str("        </wpml:waypointTurnParam>\n");
    xml.push_str("        <wpml:useStraightLine>0</wpml:useStraightLine>\n");

    // The camera's interval timer fires the shutter for the whole mission,
    // so the only takePhoto is the one that starts it at waypoint 0. Every
    // transit leg carries a gimbalEvenlyRotate toward the next waypoint's
    // pitch so the gimbal is settled on arrival.
    if is_first {
        let actions = format!(
            "{}{}",
            take_photo_action(next_action_id),
            gimbal_rotate_action(wp.gimbal_pitch_deg, next_action_id)
        );
        xml.push_str(&action_group(1, wp.index, wp.index, &actions));
        if !is_last {
            let next_pitch = mission.waypoints[i + 1].gimbal_pitch_deg;
            let transit = gimbal_evenly_rotate_action(next_pitch, next_action_id);
            xml.push_str(&action_group(2, wp.index, wp.index + 1, &transit));
        }
    } else if !is_last {
        let next_pitch = mission.waypoints[i + 1].gimbal_pitch_deg;
        let transit = gimbal_evenly_rotate_action(next_pitch, next_action_id);
        xml.push_str(&action_group(1, wp.index, wp.index + 1, &transit));
    }

    xml.push_str("        <wpml:waypointGimbalHeadingParam>\n");
    xml.push_str("          <wpml:waypointGimbalPitchAngle>0</wpml:waypointGimbalPitchAngle>\n");
    xml.push_str("          <wpml:waypointGimbalYawAngle>0</wpml:waypointGimbalYawAngle>\n");
    xml.push_str("        </wpml:waypointGimbalHeadingParam>\n");
    xml.push_str("      </Placemark>\n");
    xml
}

fn action_group(group_id: u32, start_index: u32, end_index: u32, actions: &str) -> String {
    let mut xml = String::new();
    xml.push_str("        <wpml:actionGroup>\n");
    let _ = writeln!(xml, "          <wpml:actionGroupId>{group_id}</wpml:actionGroupId>");
    let _ = writeln!(
        xml,
        "          <wpml:actionGroupStartIndex>{start_index}</wpml:actionGroupStartIndex>"
    );
    let _ = writeln!(
        xml,
        "          <wpml:actionGroupEndIndex>{end_index}</wpml:actionGroupEndIndex>"
    );
    xml.push_str("          <wpml:actionGroupMode>parallel</wpml:actionGroupMode>\n");
    xml.push_str("          <wpml:actionTrigger>\n");
    xml.push_str("            <wpml:actionTriggerType>reachPoint</wpml:actionTriggerType>\n");
    xml.push_str("          </wpml:actionTrigger>\n");
    xml.push_str(actions);
    xml.push_str("        </wpml:actionGroup>\n");
    xml
}

fn take_photo_action(next_action_id: &mut u32) -> String {
    let action_id = bump(next_action_id);
    let mut xml = String::new();
    xml.push_str("          <wpml:action>\n");
    let _ = writeln!(xml, "            <wpml:actionId>{action_id}</wpml:actionId>");
    xml.push_str("            <wpml:actionActuatorFunc>takePhoto</wpml:actionActuatorFunc>\n");
    xml.push_str("            <wpml:actionActuatorFuncParam>\n");
    xml.push_str("              <wpml:payloadPositionIndex>0</wpml:payloadPositionIndex>\n");
    xml.push_str(
        "              <wpml:useGlobalPayloadLensIndex>0</wpml:useGlobalPayloadLensIndex>\n",
    );
    xml.push_str("            </wpml:actionActuatorFuncParam>\n");
    xml.push_str("          </wpml:action>\n");
    xml
}

fn gimbal_rotate_action(pitch_deg: f64, next_action_id: &mut u32) -> String {
    let action_id = bump(next_action_id);
    let mut xml = String::new();
    xml.push_str("          <wpml:action>\n");
    let _ = writeln!(xml, "            <wpml:actionId>{action_id}</wpml:actionId>");
    xml.push_str("            <wpml:actionActuatorFunc>gimbalRotate</wpml:actionActuatorFunc>\n");
    xml.push_str("            <wpml:actionActuatorFuncParam>\n");
    xml.push_str("              <wpml:gimbalHeadingYawBase>aircraft</wpml:gimbalHeadingYawBase>\n");
    xml.push_str("              <wpml:gimbalRotateMode>absoluteAngle</wpml:gimbalRotateMode>\n");
    xml.push_str(
        "              <wpml:gimbalPitchRotateEnable>1</wpml:gimbalPitchRotateEnable>\n",
    );
    let _ = writeln!(
        xml,
        "              <wpml:gimbalPitchRotateAngle>{pitch_deg}</wpml:gimbalPitchRotateAngle>"
    );
    xml.push_str("              <wpml:gimbalRollRotateEnable>1</wpml:gimbalRollRotateEnable>\n");
    xml.push_str("              <wpml:gimbalRollRotateAngle>0</wpml:gimbalRollRotateAngle>\n");
    xml.push_str("              <wpml:gimbalYawRotateEnable>0</wpml:gimbalYawRotateEnable>\n");
    xml.push_str("              <wpml:gimbalYawRotateAngle>0</wpml:gimbalYawRotateAngle>\n");
    xml.push_str("              <wpml:gimbalRotateTimeEnable>0</wpml:gimbalRotateTimeEnable>\n");
    xml.push_str("              <wpml:gimbalRotateTime>0</wpml:gimbalRotateTime>\n");
    xml.push_str("              <wpml:payloadPositionIndex>0</wpml:payloadPositionIndex>\n");
    xml.push_str("            </wpml:actionActuatorFuncParam>\n");
    xml.push_str("          </wpml:action>\n");
    xml
}

fn gimbal_evenly_rotate_action(pitch_deg: f64, next_action_id: &mut u32) -> String {
    // The firmware rejects a transit rotation with pitch 0; a level target
    // is nudged just below the horizon.
    let pitch_deg = if pitch_deg >= 0.0 { -1.0 } else { pitch_deg };
    let action_id = bump(next_action_id);
    let mut xml = String::new();
    xml.push_str("          <wpml:action>\n");
    let _ = writeln!(xml, "            <wpml:actionId>{action_id}</wpml:actionId>");
    xml.push_str(
        "            <wpml:actionActuatorFunc>gimbalEvenlyRotate</wpml:actionActuatorFunc>\n",
    );
    xml.push_str("            <wpml:actionActuatorFuncParam>\n");
    let _ = writeln!(
        xml,
        "              <wpml:gimbalPitchRotateAngle>{pitch_deg}</wpml:gimbalPitchRotateAngle>"
    );
    xml.push_str("              <wpml:gimbalRollRotateAngle>0</wpml:gimbalRollRotateAngle>\n");
    xml.push_str("              <wpml:payloadPositionIndex>0</wpml:payloadPositionIndex>\n");
    xml.push_str("            </wpml:actionActuatorFuncParam>\n");
    xml.push_str("          </wpml:action>\n");
    xml
}

fn bump(next_action_id: &mut u32) -> u32 {
    let id = *next_action_id;
    *next_action_id += 1;
    id
}
