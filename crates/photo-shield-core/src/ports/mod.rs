//! Port definitions for hexagonal architecture.
//!
//! The core talks to every external collaborator through one of these traits.
//! Adapters live in `photo-shield-adapters`; mocks in `photo-shield-test-support`.

mod barcode_decoder;
mod face_detector;
mod image_source;
mod progress;
mod result_output;
mod tag_reader;
mod text_recognizer;

pub use barcode_decoder::{BarcodeDecoder, BarcodeHit};
pub use face_detector::{FaceBox, FaceDetector};
pub use image_source::ImageSource;
pub use progress::{ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
pub use tag_reader::{keys, TagMap, TagReader, TagValue};
pub use text_recognizer::{TextRecognizer, TextScan};
