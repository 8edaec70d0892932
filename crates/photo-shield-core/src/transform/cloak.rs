//! Adversarial noise cloaking.

use image::RgbImage;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::domain::BoundingBox;
use crate::error::ShieldError;

/// Zero-mean Gaussian pixel noise.
#[derive(Debug, Clone, Copy)]
pub struct NoiseCloak {
    dist: Normal<f64>,
}

impl NoiseCloak {
    /// # Errors
    ///
    /// Returns [`ShieldError::NoiseParameters`] for a negative or non-finite
    /// standard deviation.
    pub fn new(stddev: f64) -> Result<Self, ShieldError> {
        if !(stddev.is_finite() && stddev >= 0.0) {
            return Err(ShieldError::NoiseParameters(format!(
                "stddev must be finite and non-negative, got {stddev}"
            )));
        }
        let dist = Normal::new(0.0, stddev)
            .map_err(|e| ShieldError::NoiseParameters(format!("stddev {stddev}: {e}")))?;
        Ok(Self { dist })
    }

    /// Adds noise to every channel of every pixel in `region`, saturating at
    /// 0 and 255. `region` must already be clipped to the image.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply<R: Rng + ?Sized>(&self, image: &mut RgbImage, region: BoundingBox, rng: &mut R) {
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                let pixel = image.get_pixel_mut(x, y);
                for channel in &mut pixel.0 {
                    let noise = self.dist.sample(rng).round().clamp(-255.0, 255.0) as i16;
                    *channel = (i16::from(*channel) + noise).clamp(0, 255) as u8;
                }
            }
        }
    }
}
