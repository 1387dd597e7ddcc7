//! Presentation model for the preview overlay.
//!
//! Converts detector bounding boxes into preview coordinates for the lock-on
//! rectangle and formats the roll/yaw/pitch labels. Nothing here draws; the
//! sink decides how to render an [`OverlayFrame`].

use crate::{
    constants::LOCK_ON_BORDER_WIDTH,
    observation::{Detection, FaceObservation, NormalizedRect},
    Error, Result,
};

/// Rectangle in preview (view) coordinates, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Camera frame shown in a view with aspect-fill gravity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewGeometry {
    pub view_width: f64,
    pub view_height: f64,
    pub frame_width: f64,
    pub frame_height: f64,
    /// Front camera previews are mirrored horizontally
    pub mirrored: bool,
}

impl PreviewGeometry {
    /// Create a preview geometry
    ///
    /// # Errors
    ///
    /// Returns an error if any dimension is not a positive finite number
    pub fn new(view_width: f64, view_height: f64, frame_width: f64, frame_height: f64, mirrored: bool) -> Result<Self> {
        for (name, value) in [
            ("view width", view_width),
            ("view height", view_height),
            ("frame width", frame_width),
            ("frame height", frame_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidInput(format!("Preview {name} must be positive, got {value}")));
            }
        }

        Ok(Self {
            view_width,
            view_height,
            frame_width,
            frame_height,
            mirrored,
        })
    }

    /// Scale applied to the frame so it covers the whole view
    #[must_use]
    pub fn fill_scale(&self) -> f64 {
        (self.view_width / self.frame_width).max(self.view_height / self.frame_height)
    }

    /// Lock-on rectangle for a detector bounding box
    ///
    /// The box is flipped to a top-left origin, scaled and centre-cropped the
    /// way aspect-fill lays out the frame, then mirrored for the front camera.
    #[must_use]
    pub fn lock_on_rect(&self, bbox: &NormalizedRect) -> ViewRect {
        let scale = self.fill_scale();
        let shown_width = self.frame_width * scale;
        let shown_height = self.frame_height * scale;
        let offset_x = (self.view_width - shown_width) / 2.0;
        let offset_y = (self.view_height - shown_height) / 2.0;

        let top = 1.0 - bbox.y - bbox.height;
        let width = bbox.width * shown_width;
        let height = bbox.height * shown_height;
        let mut x = offset_x + bbox.x * shown_width;
        let y = offset_y + top * shown_height;

        if self.mirrored {
            x = self.view_width - x - width;
        }

        ViewRect { x, y, width, height }
    }
}

/// Text of the three angle labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AngleLabels {
    pub roll: String,
    pub yaw: String,
    pub pitch: String,
}

impl AngleLabels {
    /// Format the labels; a missing angle leaves an empty value line
    #[must_use]
    pub fn from_observation(face: &FaceObservation) -> Self {
        Self {
            roll: label("roll", face.roll),
            yaw: label("yaw", face.yaw),
            pitch: label("pitch", face.pitch),
        }
    }
}

fn label(name: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{name}\n{v}"),
        None => format!("{name}\n"),
    }
}

/// What the presentation sink should show for one frame
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayFrame {
    /// No face: hide the lock-on rectangle, keep the last labels
    Hidden,
    Visible {
        rect: ViewRect,
        labels: AngleLabels,
        border_width: f64,
    },
}

impl OverlayFrame {
    #[must_use]
    pub fn from_detection(detection: &Detection, geometry: &PreviewGeometry) -> Self {
        match detection {
            Detection::NoFace => Self::Hidden,
            Detection::Face(face) => Self::Visible {
                rect: geometry.lock_on_rect(&face.bounding_box),
                labels: AngleLabels::from_observation(face),
                border_width: LOCK_ON_BORDER_WIDTH,
            },
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EPSILON;

    fn assert_rect_eq(actual: ViewRect, expected: ViewRect) {
        assert!((actual.x - expected.x).abs() < EPSILON, "x: {actual:?} vs {expected:?}");
        assert!((actual.y - expected.y).abs() < EPSILON, "y: {actual:?} vs {expected:?}");
        assert!((actual.width - expected.width).abs() < EPSILON);
        assert!((actual.height - expected.height).abs() < EPSILON);
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(PreviewGeometry::new(0.0, 100.0, 100.0, 100.0, false).is_err());
        assert!(PreviewGeometry::new(100.0, f64::NAN, 100.0, 100.0, false).is_err());
    }

    #[test]
    fn test_lock_on_rect_same_aspect() {
        let geometry = PreviewGeometry::new(200.0, 200.0, 100.0, 100.0, false).unwrap();
        let rect = geometry.lock_on_rect(&NormalizedRect::new(0.1, 0.2, 0.3, 0.4));

        // top edge sits at 1 - 0.2 - 0.4 = 0.4 of the frame
        assert_rect_eq(
            rect,
            ViewRect {
                x: 20.0,
                y: 80.0,
                width: 60.0,
                height: 80.0,
            },
        );
    }

    #[test]
    fn test_lock_on_rect_cropped_and_mirrored() {
        // Frame twice as tall as the view: 50 points cropped above and below
        let geometry = PreviewGeometry::new(100.0, 100.0, 100.0, 200.0, true).unwrap();
        assert_eq!(geometry.fill_scale(), 1.0);

        let rect = geometry.lock_on_rect(&NormalizedRect::new(0.1, 0.25, 0.2, 0.25));
        assert_rect_eq(
            rect,
            ViewRect {
                x: 70.0,
                y: 50.0,
                width: 20.0,
                height: 50.0,
            },
        );
    }

    #[test]
    fn test_labels() {
        let face = FaceObservation::new(NormalizedRect::new(0.0, 0.0, 0.5, 0.5)).with_angles(0.5, -0.25, 0.125);
        let labels = AngleLabels::from_observation(&face);
        assert_eq!(labels.roll, "roll\n0.5");
        assert_eq!(labels.yaw, "yaw\n-0.25");
        assert_eq!(labels.pitch, "pitch\n0.125");

        let bare = FaceObservation::new(NormalizedRect::new(0.0, 0.0, 0.5, 0.5));
        assert_eq!(AngleLabels::from_observation(&bare).pitch, "pitch\n");
    }

    #[test]
    fn test_overlay_from_detection() {
        let geometry = PreviewGeometry::new(100.0, 100.0, 100.0, 100.0, false).unwrap();
        assert_eq!(OverlayFrame::from_detection(&Detection::NoFace, &geometry), OverlayFrame::Hidden);

        let face = FaceObservation::new(NormalizedRect::new(0.0, 0.0, 0.5, 0.5));
        let frame = OverlayFrame::from_detection(&Detection::Face(face), &geometry);
        assert!(frame.is_visible());
        match frame {
            OverlayFrame::Visible { border_width, .. } => assert_eq!(border_width, LOCK_ON_BORDER_WIDTH),
            OverlayFrame::Hidden => panic!("Expected visible overlay"),
        }
    }
}
