//! photo-shield core: detection aggregation, risk scoring and region transforms.
//!
//! The crate is organized around ports. Face detection, barcode decoding, OCR
//! and metadata reading are traits in [`ports`]; the analyzers in [`modules`]
//! combine them into a [`ScanReport`], and [`transform`] applies redaction
//! and cloaking to the detections a report indexes.

pub mod domain;
pub mod error;
pub mod inference;
pub mod modules;
pub mod pipeline;
pub mod ports;
pub mod session;
pub mod transform;

pub use domain::{
    parse_indices, BoundingBox, Detection, DetectionKind, DetectionSet, DetectionToken,
    ForensicsReport, ImageDimensions, ImageInfo, LightingClass, MetadataReport, OcrStatus,
    PiiFinding, PiiFindings, PiiScan, ProtectAction, ProtectRequest, ScanRecord, ScanReport,
    Status, Threat, TrustAssessment,
};
pub use error::ShieldError;
pub use inference::{BlazeFaceConfig, BlazeFaceDetector};
pub use modules::{
    ContentConfig, ContentDetector, ForensicsAnalyzer, ForensicsConfig, MetadataRisk, RiskEngine,
    RiskSignals, RiskWeights,
};
pub use pipeline::{Collaborators, ScanConfig, ScanOutcome, Scanner};
pub use ports::{
    BarcodeDecoder, BarcodeHit, FaceBox, FaceDetector, ImageSource, ProgressEvent, ProgressSink,
    ResultOutput, TagMap, TagReader, TagValue, TextRecognizer, TextScan,
};
pub use session::Session;
pub use transform::{RegionTransformer, TransformConfig};
