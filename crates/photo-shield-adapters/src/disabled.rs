//! Stand-ins for detectors switched off by configuration.

use photo_shield_core::{FaceBox, FaceDetector, ImageInfo, TextRecognizer, TextScan};

/// Face detection turned off: never finds a face.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFaceDetector;

impl FaceDetector for NoFaceDetector {
    fn detect(&self, _image: &ImageInfo) -> anyhow::Result<Vec<FaceBox>> {
        Ok(vec![])
    }

    fn fingerprint(&self) -> String {
        "faces-disabled".into()
    }
}

/// OCR turned off: every scan reports the engine as unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTextRecognizer;

impl TextRecognizer for NoTextRecognizer {
    fn recognize(&self, _image: &ImageInfo) -> TextScan {
        TextScan::Unavailable {
            reason: "OCR disabled".into(),
        }
    }
}
