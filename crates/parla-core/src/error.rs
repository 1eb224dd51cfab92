//! Error types for Parla

use thiserror::Error;

use crate::FeatureGroup;

/// Failure classes of the animation core
///
/// All of them are local and non-fatal; none may crash the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No face found, or the detector could not load. Surfaced as a status
    /// string; no render loop starts.
    Detection,
    /// Speech engine error. Surfaced as a status string; the render loop stops.
    Speech,
    /// Render/animate called before geometry exists. Logged, no-op.
    MissingGeometry,
    /// Invalid input handed to the core (landmarks, image, configuration)
    Setup,
}

/// Core Parla errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParlaError {
    // Detection errors
    #[error("No face found in the image")]
    NoFaceFound,

    #[error("Face detector failed to load: {0}")]
    DetectorLoad(String),

    #[error("Face detection failed: {0}")]
    DetectorFailed(String),

    // Geometry errors
    #[error("Invalid landmark group {group:?}: expected {expected} points, got {actual}")]
    InvalidLandmarks {
        group: FeatureGroup,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid landmark count: expected {expected}, got {actual}")]
    InvalidLandmarkCount { expected: usize, actual: usize },

    #[error("Invalid face box: {width}x{height}")]
    InvalidFaceBox { width: f64, height: f64 },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    // Speech errors
    #[error("Speech synthesis failed: {0}")]
    Speech(String),

    #[error("Speech engine busy")]
    SpeechBusy,

    // Session errors
    #[error("No face geometry loaded")]
    MissingGeometry,

    #[error("Invalid perspective: {0} (must be > 0)")]
    InvalidPerspective(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ParlaError {
    /// Failure class of this error
    pub fn kind(&self) -> FailureKind {
        match self {
            ParlaError::NoFaceFound
            | ParlaError::DetectorLoad(_)
            | ParlaError::DetectorFailed(_) => FailureKind::Detection,
            ParlaError::Speech(_) | ParlaError::SpeechBusy => FailureKind::Speech,
            ParlaError::MissingGeometry => FailureKind::MissingGeometry,
            ParlaError::InvalidLandmarks { .. }
            | ParlaError::InvalidLandmarkCount { .. }
            | ParlaError::InvalidFaceBox { .. }
            | ParlaError::InvalidImage(_)
            | ParlaError::InvalidPerspective(_)
            | ParlaError::InvalidConfig(_) => FailureKind::Setup,
        }
    }
}

/// Result type for Parla operations
pub type ParlaResult<T> = Result<T, ParlaError>;
