//! Content detection: faces, barcodes and personal text.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, warn};

use crate::domain::{
    BoundingBox, Detection, DetectionSet, ImageInfo, PiiFinding, PiiFindings, PiiScan,
};
use crate::ports::{BarcodeDecoder, FaceBox, FaceDetector, TextRecognizer, TextScan};

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"(\+\d{1,2}\s)?\(?\d{3}\)?[\s.-]\d{3}[\s.-]\d{4}").expect("valid phone regex")
    })
}

/// Configuration for content detection.
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Face height over image height above which a face is a close-up.
    pub face_size_ratio: f32,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            face_size_ratio: 0.2,
        }
    }
}

/// Finds faces, barcodes and personal text through the detector ports.
pub struct ContentDetector {
    config: ContentConfig,
    faces: Arc<dyn FaceDetector>,
    barcodes: Arc<dyn BarcodeDecoder>,
    text: Arc<dyn TextRecognizer>,
}

impl ContentDetector {
    #[must_use]
    pub fn new(
        config: ContentConfig,
        faces: Arc<dyn FaceDetector>,
        barcodes: Arc<dyn BarcodeDecoder>,
        text: Arc<dyn TextRecognizer>,
    ) -> Self {
        Self {
            config,
            faces,
            barcodes,
            text,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Identifies everything that determines the output of [`Self::detect`].
    #[must_use]
    pub fn fingerprint(&self) -> String {
        format!(
            "{};ratio={}",
            self.faces.fingerprint(),
            self.config.face_size_ratio
        )
    }

    /// Detects faces and barcodes concurrently.
    ///
    /// # Errors
    ///
    /// Returns an error if either detector fails.
    pub fn detect(&self, image: &ImageInfo) -> Result<DetectionSet> {
        let (faces, barcodes) =
            rayon::join(|| self.detect_faces(image), || self.detect_barcodes(image));
        let (faces, close_up_risk) = faces?;

        Ok(DetectionSet {
            faces,
            barcodes: barcodes?,
            close_up_risk,
        })
    }

    /// Detects faces and whether any of them is a close-up.
    ///
    /// # Errors
    ///
    /// Returns an error if the face detector fails.
    pub fn detect_faces(&self, image: &ImageInfo) -> Result<(Vec<Detection>, bool)> {
        let boxes = self
            .faces
            .detect(image)
            .with_context(|| format!("Face detection failed for {}", image.path))?;

        let faces: Vec<Detection> = boxes
            .iter()
            .filter_map(|f| face_box(f, image.width, image.height))
            .map(Detection::face)
            .collect();

        let close_up_risk = faces
            .iter()
            .any(|d| self.is_close_up(d.bbox.height, image.height));

        debug!(
            "{}: {} faces, close-up: {}",
            image.path,
            faces.len(),
            close_up_risk
        );
        Ok((faces, close_up_risk))
    }

    fn is_close_up(&self, face_height: u32, image_height: u32) -> bool {
        image_height > 0
            && f64::from(face_height) / f64::from(image_height)
                > f64::from(self.config.face_size_ratio)
    }

    /// Detects barcodes and QR codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder fails.
    pub fn detect_barcodes(&self, image: &ImageInfo) -> Result<Vec<Detection>> {
        let hits = self
            .barcodes
            .decode(image)
            .with_context(|| format!("Barcode decoding failed for {}", image.path))?;

        let barcodes: Vec<Detection> = hits
            .iter()
            .filter_map(|hit| BoundingBox::enclosing(&hit.points, image.width, image.height))
            .map(Detection::barcode)
            .collect();

        debug!("{}: {} barcodes", image.path, barcodes.len());
        Ok(barcodes)
    }

    /// Runs OCR and looks for email addresses and phone numbers.
    ///
    /// Never fails; an OCR engine problem is reported in the result.
    #[must_use]
    pub fn scan_text_pii(&self, image: &ImageInfo) -> PiiScan {
        match self.text.recognize(image) {
            TextScan::Text(text) => PiiScan::Findings(find_pii(&text)),
            TextScan::Unavailable { reason } => {
                warn!("OCR unavailable for {}: {}", image.path, reason);
                PiiScan::EngineUnavailable { reason }
            }
        }
    }
}

/// Converts a detector box to pixel bounds clipped to the image.
fn face_box(face: &FaceBox, width: u32, height: u32) -> Option<BoundingBox> {
    let (x1, y1) = (face.x, face.y);
    let (x2, y2) = (face.x + face.width, face.y + face.height);
    if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
        return None;
    }
    // Negative coordinates saturate to zero in the casts.
    let (x1, y1) = (x1.round().max(0.0) as u32, y1.round().max(0.0) as u32);
    let (x2, y2) = (x2.round().max(0.0) as u32, y2.round().max(0.0) as u32);
    if x2 <= x1 || y2 <= y1 {
        return None;
    }
    BoundingBox::new(x1, y1, x2 - x1, y2 - y1).clip(width, height)
}

/// Email and phone presence in free text.
#[must_use]
pub fn find_pii(text: &str) -> PiiFindings {
    let mut findings = PiiFindings::new();
    if email_regex().is_match(text) {
        findings.insert(PiiFinding::EmailFound);
    }
    if phone_regex().is_match(text) {
        findings.insert(PiiFinding::PhoneFound);
    }
    findings
}
