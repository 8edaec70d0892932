//! Face detector port.

use crate::domain::ImageInfo;

/// A detected face in pixel coordinates, before any size filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Detector confidence in `[0, 1]`.
    pub score: f32,
}

/// Port for frontal face detection.
///
/// Implementations must be deterministic: the same pixels yield the same
/// boxes in the same order.
pub trait FaceDetector: Send + Sync {
    /// Detects faces in the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded or inference fails.
    fn detect(&self, image: &ImageInfo) -> anyhow::Result<Vec<FaceBox>>;

    /// Identifies the detector and its parameters.
    ///
    /// Two detectors with the same fingerprint must produce the same boxes.
    fn fingerprint(&self) -> String;
}
