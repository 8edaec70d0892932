//! OCR port.

use crate::domain::ImageInfo;

/// Outcome of running OCR on an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextScan {
    /// The engine ran. The text may be empty.
    Text(String),
    /// The engine is missing or failed.
    Unavailable { reason: String },
}

/// Port for optical character recognition.
///
/// Engine failures are reported as [`TextScan::Unavailable`], never as errors,
/// so a scan always completes without OCR.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &ImageInfo) -> TextScan;
}
