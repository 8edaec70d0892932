//! Core domain types for photo risk scanning.

mod assessment;
mod detection;
mod image_info;
mod protect;
mod reports;

pub use assessment::{OcrStatus, ScanRecord, ScanReport, Status, Threat, TrustAssessment};
pub use detection::{BoundingBox, Detection, DetectionKind, DetectionSet, DetectionToken};
pub use image_info::{ImageDimensions, ImageInfo};
pub use protect::{parse_indices, ProtectAction, ProtectRequest};
pub use reports::{
    ForensicsReport, LightingClass, MetadataReport, PiiFinding, PiiFindings, PiiScan,
};
