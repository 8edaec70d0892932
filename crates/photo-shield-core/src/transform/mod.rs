//! Region transforms addressed by detection: preview, redaction, cloaking.

mod blur;
mod cloak;
mod font;
mod preview;

pub use blur::{blur_region, kernel_size};
pub use cloak::NoiseCloak;
pub use preview::{annotate, label};

use image::{Rgb, RgbImage};
use rand::Rng;
use tracing::debug;

use crate::domain::{BoundingBox, Detection, DetectionKind};
use crate::error::ShieldError;

/// Configuration for region transforms.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Gaussian sigma for face redaction.
    pub blur_sigma: f64,
    /// Noise standard deviation for cloaking.
    pub cloak_stddev: f64,
    /// Integer scale of the preview label font.
    pub label_scale: u32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 30.0,
            cloak_stddev: 25.0,
            label_scale: 2,
        }
    }
}

/// Applies detection-specific transforms to caller-owned buffers.
#[derive(Debug, Clone)]
pub struct RegionTransformer {
    config: TransformConfig,
    cloak: NoiseCloak,
}

impl RegionTransformer {
    /// # Errors
    ///
    /// Returns [`ShieldError::NoiseParameters`] if the cloak deviation is invalid.
    pub fn new(config: TransformConfig) -> Result<Self, ShieldError> {
        let cloak = NoiseCloak::new(config.cloak_stddev)?;
        Ok(Self { config, cloak })
    }

    #[must_use]
    pub const fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Returns an annotated copy; `image` is left untouched.
    #[must_use]
    pub fn annotate_preview(&self, image: &RgbImage, detections: &[Detection]) -> RgbImage {
        annotate(image, detections, self.config.label_scale)
    }

    /// Redacts detections in the given order. Faces are blurred, barcodes
    /// filled black. Overlaps resolve to the last write.
    pub fn redact(&self, image: &mut RgbImage, detections: &[Detection]) {
        for detection in detections {
            let Some(region) = detection.bbox.clip(image.width(), image.height()) else {
                continue;
            };
            debug!("Redacting {} at {:?}", detection.kind, region);
            match detection.kind {
                DetectionKind::Face => blur_region(image, region, self.config.blur_sigma),
                DetectionKind::Barcode => fill(image, region, Rgb([0, 0, 0])),
            }
        }
    }

    /// Cloaks one region using the thread-local RNG.
    pub fn cloak(&self, image: &mut RgbImage, face: BoundingBox) {
        self.cloak_with_rng(image, face, &mut rand::thread_rng());
    }

    /// Cloaks one region using the given RNG.
    pub fn cloak_with_rng<R: Rng + ?Sized>(
        &self,
        image: &mut RgbImage,
        face: BoundingBox,
        rng: &mut R,
    ) {
        if let Some(region) = face.clip(image.width(), image.height()) {
            self.cloak.apply(image, region, rng);
        }
    }

    /// Cloaks every face detection; other kinds are ignored.
    pub fn cloak_faces<R: Rng + ?Sized>(
        &self,
        image: &mut RgbImage,
        detections: &[Detection],
        rng: &mut R,
    ) {
        for detection in detections.iter().filter(|d| d.kind == DetectionKind::Face) {
            self.cloak_with_rng(image, detection.bbox, rng);
        }
    }
}

fn fill(image: &mut RgbImage, region: BoundingBox, color: Rgb<u8>) {
    for y in region.y..region.bottom() {
        for x in region.x..region.right() {
            image.put_pixel(x, y, color);
        }
    }
}
