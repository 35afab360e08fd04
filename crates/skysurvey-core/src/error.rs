//! Error taxonomy for the planning pipeline.
//!
//! Geometry-level degeneracies (too few vertices, a single offset line
//! failing) are absorbed where they occur and never surface here; only
//! structural violations abort an operation.

use crate::models::PatternKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// Serialization was attempted on a mission with zero waypoints.
    #[error("mission has no waypoints")]
    EmptyMission,

    /// The requested pattern cannot be generated from the supplied area
    /// definition (e.g. a grid over an orbit definition). Contract
    /// violation on the caller's side.
    #[error("{pattern:?} pattern cannot be generated from a {area} area")]
    PatternAreaMismatch {
        pattern: PatternKind,
        area: &'static str,
    },

    #[error("failed to write mission archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("i/o error while packaging mission: {0}")]
    Io(#[from] std::io::Error),
}
