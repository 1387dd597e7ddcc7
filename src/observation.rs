//! Face observations delivered by the detector for each camera frame.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Rectangle in normalised image coordinates, origin at the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedRect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check that the rectangle is finite, non-negative and inside the unit square
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated bound
    pub fn validate(&self) -> Result<()> {
        let fields = [self.x, self.y, self.width, self.height];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput(format!("Bounding box has non-finite coordinates: {self:?}")));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(Error::InvalidInput(format!("Bounding box has negative size: {self:?}")));
        }
        if self.x < 0.0 || self.y < 0.0 || self.x + self.width > 1.0 || self.y + self.height > 1.0 {
            return Err(Error::InvalidInput(format!(
                "Bounding box lies outside the unit square: {self:?}"
            )));
        }
        Ok(())
    }
}

/// One detected face with its orientation angles
///
/// Angles are optional because the detector does not always estimate them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bounding_box: NormalizedRect,
    #[serde(default)]
    pub roll: Option<f64>,
    #[serde(default)]
    pub yaw: Option<f64>,
    #[serde(default)]
    pub pitch: Option<f64>,
}

impl FaceObservation {
    #[must_use]
    pub fn new(bounding_box: NormalizedRect) -> Self {
        Self {
            bounding_box,
            roll: None,
            yaw: None,
            pitch: None,
        }
    }

    #[must_use]
    pub fn with_angles(mut self, roll: f64, yaw: f64, pitch: f64) -> Self {
        self.roll = Some(roll);
        self.yaw = Some(yaw);
        self.pitch = Some(pitch);
        self
    }
}

/// Detector result for a single frame; only the first face is kept
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detection {
    Face(FaceObservation),
    NoFace,
}

impl Detection {
    /// Build a detection from every face found in a frame
    #[must_use]
    pub fn from_faces(faces: &[FaceObservation]) -> Self {
        faces.first().map_or(Self::NoFace, |face| Self::Face(*face))
    }

    /// Pitch of the detected face, if any
    #[must_use]
    pub fn pitch(&self) -> Option<f64> {
        match self {
            Self::Face(face) => face.pitch,
            Self::NoFace => None,
        }
    }
}
