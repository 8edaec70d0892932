//! Barcode decoder port.

use crate::domain::ImageInfo;

/// A decoded symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeHit {
    /// Corner or scan-line points reported by the decoder, in pixels.
    pub points: Vec<(f32, f32)>,
    /// Decoded contents.
    pub payload: String,
}

/// Port for barcode and QR code decoding.
pub trait BarcodeDecoder: Send + Sync {
    /// Finds every decodable symbol, in a deterministic order.
    ///
    /// An image with no symbols yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the decoder itself fails.
    fn decode(&self, image: &ImageInfo) -> anyhow::Result<Vec<BarcodeHit>>;
}
