//! [`FaceDetector`] backed by the `BlazeFace` network.

#![allow(clippy::cast_precision_loss)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::{select_device, BlazeFace, LazyModel, RawFace};
use crate::domain::ImageInfo;
use crate::ports::{FaceBox, FaceDetector};

/// Detection parameters, fixed for the lifetime of a detector.
#[derive(Debug, Clone)]
pub struct BlazeFaceConfig {
    /// Path to `blazeface.safetensors`.
    pub model_path: PathBuf,
    /// Minimum confidence to keep a face.
    pub min_score: f32,
    /// IoU above which the weaker of two overlapping faces is dropped.
    pub nms_threshold: f32,
    /// Faces smaller than this many pixels on either side are dropped.
    pub min_size: u32,
    /// Use a GPU backend when one is compiled in.
    pub prefer_gpu: bool,
}

impl BlazeFaceConfig {
    #[must_use]
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            min_score: 0.75,
            nms_threshold: 0.3,
            min_size: 30,
            prefer_gpu: true,
        }
    }
}

/// Face detector that loads `BlazeFace` on first use.
pub struct BlazeFaceDetector {
    config: BlazeFaceConfig,
    model: LazyModel<BlazeFace>,
}

impl BlazeFaceDetector {
    #[must_use]
    pub fn new(config: BlazeFaceConfig) -> Self {
        let model = LazyModel::new(
            &config.model_path,
            select_device(config.prefer_gpu),
            BlazeFace::new,
        );
        Self { config, model }
    }

    #[must_use]
    pub fn model_path(&self) -> &Path {
        self.model.path()
    }

    /// Scales a normalized detection to pixel coordinates.
    fn to_pixels(face: &RawFace, width: u32, height: u32) -> FaceBox {
        let (w, h) = (width as f32, height as f32);
        let [x0, y0, x1, y1] = face.bbox;
        FaceBox {
            x: x0 * w,
            y: y0 * h,
            width: (x1 - x0) * w,
            height: (y1 - y0) * h,
            score: face.score,
        }
    }
}

impl FaceDetector for BlazeFaceDetector {
    fn detect(&self, image: &ImageInfo) -> Result<Vec<FaceBox>> {
        let model = self
            .model
            .get()
            .context("BlazeFace model unavailable (run `photo-shield models fetch`)")?;

        let raw = model
            .detect(&image.pixels, self.config.min_score, self.config.nms_threshold)
            .context("Face detection failed")?;

        let min = self.config.min_size as f32;
        let faces: Vec<FaceBox> = raw
            .iter()
            .map(|f| Self::to_pixels(f, image.width, image.height))
            .filter(|f| f.width >= min && f.height >= min)
            .collect();

        debug!(
            "{}: {} raw faces, {} after size filter",
            image.path,
            raw.len(),
            faces.len()
        );
        Ok(faces)
    }

    fn fingerprint(&self) -> String {
        format!(
            "blazeface:{}:score={}:nms={}:min={}",
            self.config.model_path.display(),
            self.config.min_score,
            self.config.nms_threshold,
            self.config.min_size
        )
    }
}
