//! Barcode and QR decoding with `rxing`.

use anyhow::{anyhow, Result};
use photo_shield_core::{BarcodeDecoder, BarcodeHit, ImageInfo};
use rxing::Exceptions;
use tracing::debug;

/// Decodes every symbol rxing can find in the luma channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct RxingDecoder;

impl RxingDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl BarcodeDecoder for RxingDecoder {
    fn decode(&self, image: &ImageInfo) -> Result<Vec<BarcodeHit>> {
        if image.width == 0 || image.height == 0 {
            return Ok(vec![]);
        }
        let luma = image.to_luma8().into_raw();

        let results = match rxing::helpers::detect_multiple_in_luma(luma, image.width, image.height)
        {
            Ok(results) => results,
            Err(Exceptions::NotFoundException(_)) => return Ok(vec![]),
            Err(e) => return Err(anyhow!("Barcode decoder failed: {e}")),
        };

        let hits: Vec<BarcodeHit> = results
            .iter()
            .map(|r| BarcodeHit {
                points: r.getPoints().iter().map(|p| (p.x, p.y)).collect(),
                payload: r.getText().to_string(),
            })
            .collect();
        debug!("{}: decoded {} symbols", image.path, hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_image_has_no_symbols() {
        let image = ImageInfo::from_rgb("blank.png", image::RgbImage::new(64, 64));
        assert!(RxingDecoder::new().decode(&image).unwrap().is_empty());
    }
}
