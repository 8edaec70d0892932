//! Risk assessment and scan result types.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::{
    Detection, DetectionToken, ForensicsReport, ImageDimensions, MetadataReport, PiiFindings,
};

/// A risk signal raised by the risk engine.
///
/// Serialized as its human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Threat {
    /// Recompression error suggests the image was edited.
    Manipulation,
    /// GPS coordinates are embedded in the file.
    GpsEmbedded,
    /// A close-up face is present.
    CloseUpFace,
    /// Barcodes or QR codes are visible.
    Barcodes { count: usize },
    /// OCR found personal text.
    PersonalText(PiiFindings),
    /// Close-up face and GPS together.
    Critical,
}

impl fmt::Display for Threat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manipulation => f.write_str("Possible Digital Manipulation (Deepfake/Photoshop)"),
            Self::GpsEmbedded => f.write_str("GPS Location Data Embedded"),
            Self::CloseUpFace => f.write_str("Potential Child Detected (Sharenting Risk)"),
            Self::Barcodes { count } => write!(f, "Found {count} Barcodes/QR Codes"),
            Self::PersonalText(findings) => {
                write!(f, "Personal Text Found: {}", findings.joined())
            }
            Self::Critical => f.write_str("CRITICAL: Child Face + GPS Location combined!"),
        }
    }
}

impl Serialize for Threat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Composite trust score and the threats that lowered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustAssessment {
    /// 0..=100, 100 meaning no risk signal fired.
    pub score: u8,
    /// Threats in evaluation order.
    pub threats: Vec<Threat>,
}

impl TrustAssessment {
    /// Score above which an image counts as safe.
    pub const SAFE_THRESHOLD: u8 = 50;

    #[must_use]
    pub const fn status(&self) -> Status {
        if self.score > Self::SAFE_THRESHOLD {
            Status::Safe
        } else {
            Status::HighRisk
        }
    }
}

/// Coarse verdict derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "HIGH RISK")]
    HighRisk,
}

/// Whether the OCR engine ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrStatus {
    Ok,
    Unavailable,
}

/// Everything a scan tells the client about one image.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub score: u8,
    pub status: Status,
    pub threats: Vec<Threat>,
    /// Detections in stable-index order.
    pub detections: Vec<Detection>,
    pub meta: MetadataReport,
    pub forensics: ForensicsReport,
    pub pii: PiiFindings,
    pub ocr: OcrStatus,
    /// Pass back on protect to reuse these detections.
    pub detection_token: DetectionToken,
}

impl ScanReport {
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        matches!(self.status, Status::Safe)
    }
}

/// A scan report for a file on disk, as written by batch output.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRecord {
    /// Path to the scanned image.
    pub path: String,
    /// Timestamp of the scan (ISO 8601).
    pub timestamp: String,
    pub dimensions: ImageDimensions,
    #[serde(flatten)]
    pub report: ScanReport,
}
