//! Per-analyzer reports.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Brightness distribution classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LightingClass {
    /// Brightness spread over the mid-tones.
    #[default]
    Natural,
    /// Brightness piled up at the extremes.
    ArtificialOrBad,
}

/// Output of the forensics analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForensicsReport {
    /// Recompression error exceeded the ELA factor.
    pub compression_anomaly: bool,
    /// Brightness distribution class.
    pub lighting: LightingClass,
    /// A moderate number of specular highlights is present.
    pub reflection_present: bool,
}

/// Normalized view of an image's embedded metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataReport {
    pub gps_found: bool,
    pub device_info: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl MetadataReport {
    /// Device string used when the image carries no Make or Model tag.
    pub const UNKNOWN_DEVICE: &'static str = "Unknown";
}

impl Default for MetadataReport {
    fn default() -> Self {
        Self {
            gps_found: false,
            device_info: Self::UNKNOWN_DEVICE.to_string(),
            lat: None,
            lon: None,
        }
    }
}

/// A kind of personal text found by OCR.
///
/// Variant order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiFinding {
    EmailFound,
    PhoneFound,
}

impl fmt::Display for PiiFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EmailFound => "EMAIL_FOUND",
            Self::PhoneFound => "PHONE_FOUND",
        })
    }
}

/// Set of PII findings. Iterates email before phone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PiiFindings(BTreeSet<PiiFinding>);

impl PiiFindings {
    /// Empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Adds a finding. Duplicates collapse.
    pub fn insert(&mut self, finding: PiiFinding) {
        self.0.insert(finding);
    }

    #[must_use]
    pub fn contains(&self, finding: PiiFinding) -> bool {
        self.0.contains(&finding)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = PiiFinding> + '_ {
        self.0.iter().copied()
    }

    /// Tags joined with `", "`, e.g. `EMAIL_FOUND, PHONE_FOUND`.
    #[must_use]
    pub fn joined(&self) -> String {
        self.iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<PiiFinding> for PiiFindings {
    fn from_iter<I: IntoIterator<Item = PiiFinding>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of the OCR-based PII scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PiiScan {
    /// OCR ran; these findings were matched (possibly none).
    Findings(PiiFindings),
    /// The text engine could not be used.
    EngineUnavailable { reason: String },
}

impl PiiScan {
    /// Findings for scoring. An unavailable engine counts as no findings.
    #[must_use]
    pub fn findings(&self) -> PiiFindings {
        match self {
            Self::Findings(f) => f.clone(),
            Self::EngineUnavailable { .. } => PiiFindings::new(),
        }
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Findings(_))
    }
}
