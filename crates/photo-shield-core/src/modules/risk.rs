//! Trust score aggregation.

use tracing::debug;

use crate::domain::{ForensicsReport, MetadataReport, PiiFindings, Threat, TrustAssessment};

/// Score deductions per risk signal.
#[derive(Debug, Clone)]
pub struct RiskWeights {
    pub deepfake: u8,
    pub gps: u8,
    pub child: u8,
    pub barcode: u8,
    pub pii: u8,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            deepfake: 30,
            gps: 25,
            child: 20,
            barcode: 10,
            pii: 15,
        }
    }
}

/// Signals the risk engine combines.
#[derive(Debug, Clone, Copy)]
pub struct RiskSignals<'a> {
    pub forensics: &'a ForensicsReport,
    pub metadata: &'a MetadataReport,
    pub close_up_risk: bool,
    pub barcode_count: usize,
    pub pii: &'a PiiFindings,
}

/// Pure function of its inputs: same signals, same assessment.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    weights: RiskWeights,
}

impl RiskEngine {
    #[must_use]
    pub const fn new(weights: RiskWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub const fn weights(&self) -> &RiskWeights {
        &self.weights
    }

    /// Scores the signals.
    ///
    /// Deductions apply in a fixed order, which is also the threat order.
    /// A close-up face together with GPS data zeroes the score.
    #[must_use]
    pub fn assess(&self, signals: &RiskSignals<'_>) -> TrustAssessment {
        let w = &self.weights;
        let mut score: i64 = 100;
        let mut threats = Vec::new();

        let mut deduct = |fired: bool, weight: u8, threat: Threat| {
            if fired {
                score -= i64::from(weight);
                threats.push(threat);
            }
        };

        deduct(
            signals.forensics.compression_anomaly,
            w.deepfake,
            Threat::Manipulation,
        );
        deduct(signals.metadata.gps_found, w.gps, Threat::GpsEmbedded);
        deduct(signals.close_up_risk, w.child, Threat::CloseUpFace);
        deduct(
            signals.barcode_count > 0,
            w.barcode,
            Threat::Barcodes {
                count: signals.barcode_count,
            },
        );
        deduct(
            !signals.pii.is_empty(),
            w.pii,
            Threat::PersonalText(signals.pii.clone()),
        );

        if signals.metadata.gps_found && signals.close_up_risk {
            score = 0;
            threats.push(Threat::Critical);
        }

        let score = u8::try_from(score.clamp(0, 100)).unwrap_or(0);
        debug!("risk score {score}, {} threats", threats.len());

        TrustAssessment { score, threats }
    }
}
