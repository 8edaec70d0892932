//! Scan pipeline: concurrent analysis fanned into the risk engine.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::domain::{
    DetectionSet, DetectionToken, ImageInfo, OcrStatus, PiiScan, ScanReport,
};
use crate::error::ShieldError;
use crate::modules::{
    ContentConfig, ContentDetector, ForensicsAnalyzer, ForensicsConfig, MetadataRisk, RiskEngine,
    RiskSignals, RiskWeights,
};
use crate::ports::{BarcodeDecoder, FaceDetector, TagReader, TextRecognizer};
use crate::transform::{RegionTransformer, TransformConfig};

/// Tunables for every stage. Fixed once a [`Scanner`] is built.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    pub content: ContentConfig,
    pub forensics: ForensicsConfig,
    pub weights: RiskWeights,
    pub transform: TransformConfig,
}

/// The external collaborators a scanner talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub faces: Arc<dyn FaceDetector>,
    pub barcodes: Arc<dyn BarcodeDecoder>,
    pub text: Arc<dyn TextRecognizer>,
    pub tags: Arc<dyn TagReader>,
}

/// A scan report together with the detections it indexes.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub report: ScanReport,
    pub detections: DetectionSet,
}

/// Runs the full analysis of one image.
pub struct Scanner {
    content: ContentDetector,
    forensics: ForensicsAnalyzer,
    metadata: MetadataRisk,
    risk: RiskEngine,
    transformer: RegionTransformer,
}

impl Scanner {
    /// # Errors
    ///
    /// Returns [`ShieldError::NoiseParameters`] for an invalid transform config.
    pub fn new(config: ScanConfig, collaborators: Collaborators) -> Result<Self, ShieldError> {
        let Collaborators {
            faces,
            barcodes,
            text,
            tags,
        } = collaborators;

        Ok(Self {
            content: ContentDetector::new(config.content, faces, barcodes, text),
            forensics: ForensicsAnalyzer::new(config.forensics),
            metadata: MetadataRisk::new(tags),
            risk: RiskEngine::new(config.weights),
            transformer: RegionTransformer::new(config.transform)?,
        })
    }

    #[must_use]
    pub const fn content(&self) -> &ContentDetector {
        &self.content
    }

    #[must_use]
    pub const fn transformer(&self) -> &RegionTransformer {
        &self.transformer
    }

    /// Token binding a detection set to `image` under this scanner's detectors.
    #[must_use]
    pub fn token_for(&self, image: &ImageInfo) -> DetectionToken {
        DetectionToken::compute(image, &self.content.fingerprint())
    }

    /// Runs detection only.
    ///
    /// # Errors
    ///
    /// Returns an error if a detector fails.
    pub fn detect(&self, image: &ImageInfo) -> Result<DetectionSet> {
        self.content.detect(image)
    }

    /// Runs every analyzer and scores the result.
    ///
    /// Threat order is fixed by the risk engine, independent of which
    /// analyzer finishes first.
    ///
    /// # Errors
    ///
    /// Returns an error if detection, forensics or metadata reading fails.
    /// OCR problems are reported in the outcome instead.
    pub fn scan(&self, image: &ImageInfo) -> Result<ScanOutcome> {
        info!("Scanning {} ({}x{})", image.path, image.width, image.height);

        let ((detections, pii), (forensics, metadata)) = rayon::join(
            || {
                rayon::join(
                    || self.content.detect(image),
                    || self.content.scan_text_pii(image),
                )
            },
            || {
                rayon::join(
                    || self.forensics.analyze(image),
                    || self.metadata.analyze(image),
                )
            },
        );
        let detections = detections?;
        let forensics = forensics?;
        let metadata = metadata?;

        let findings = pii.findings();
        let assessment = self.risk.assess(&RiskSignals {
            forensics: &forensics,
            metadata: &metadata,
            close_up_risk: detections.close_up_risk,
            barcode_count: detections.barcodes.len(),
            pii: &findings,
        });
        debug!(
            "{}: score {} with {} threats",
            image.path,
            assessment.score,
            assessment.threats.len()
        );

        let report = ScanReport {
            score: assessment.score,
            status: assessment.status(),
            threats: assessment.threats,
            detections: detections.to_vec(),
            meta: metadata,
            forensics,
            pii: findings,
            ocr: match pii {
                PiiScan::Findings(_) => OcrStatus::Ok,
                PiiScan::EngineUnavailable { .. } => OcrStatus::Unavailable,
            },
            detection_token: self.token_for(image),
        };

        Ok(ScanOutcome { report, detections })
    }
}
