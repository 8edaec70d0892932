//! Photo Shield Adapters - External adapters for photo-shield.
//!
//! This crate provides adapters for:
//! - Filesystem image loading, upload storage and JPEG encoding
//! - EXIF tags (`kamadak-exif`)
//! - OCR (`tesseract` CLI)
//! - Barcodes and QR codes (`rxing`)
//! - Model downloading and caching

pub mod barcode;
pub mod disabled;
pub mod fs;
pub mod models;
pub mod ocr;
pub mod tags;

pub use barcode::RxingDecoder;
pub use disabled::{NoFaceDetector, NoTextRecognizer};
pub use fs::{
    encode_jpeg, load_image, load_upload, save_image, FsImageSource, DEFAULT_JPEG_QUALITY,
};
pub use models::{model_info, models_dir, ModelInfo, ModelStore, MODELS};
pub use ocr::TesseractRecognizer;
pub use tags::ExifTagReader;
