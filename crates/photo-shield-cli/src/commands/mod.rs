//! CLI command definitions and handlers.

pub mod models;
pub mod preview;
pub mod protect;
pub mod scan;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use photo_shield_adapters::{
    ExifTagReader, ModelStore, NoFaceDetector, NoTextRecognizer, RxingDecoder,
    TesseractRecognizer, DEFAULT_JPEG_QUALITY,
};
use photo_shield_core::{
    BlazeFaceConfig, BlazeFaceDetector, Collaborators, ContentConfig, FaceDetector,
    ForensicsConfig, RiskWeights, ScanConfig, Scanner, TextRecognizer,
};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

/// Photo Shield - privacy and authenticity risk scanner for photographs
#[derive(Parser)]
#[command(name = "photo-shield")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Score images for privacy and authenticity risks
    Scan(scan::ScanArgs),
    /// Write a redacted or cloaked copy of an image
    Protect(protect::ProtectArgs),
    /// Write a copy of an image with numbered detection boxes
    Preview(preview::PreviewArgs),
    /// Run the HTTP API
    Serve(serve::ServeArgs),
    /// Manage ML models
    Models(models::ModelsArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every image scanned SAFE, or the command succeeded.
    Success = 0,
    /// At least one image scanned HIGH RISK.
    HighRisk = 1,
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

/// Parse and validate a ratio (0.0-1.0).
fn parse_ratio(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Detector and scoring options shared by every command that scans.
#[derive(Args, Clone, Default)]
pub struct EngineArgs {
    /// Disable face detection
    #[arg(long)]
    pub no_faces: bool,

    /// Disable OCR (personal text is then never found)
    #[arg(long)]
    pub no_ocr: bool,

    /// Face height over image height above which a face is a close-up (0.0-1.0)
    #[arg(long, value_parser = parse_ratio)]
    pub face_size_ratio: Option<f32>,

    /// Largest recompression difference that still counts as clean
    #[arg(long, value_name = "N")]
    pub ela_factor: Option<u8>,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,
}

impl EngineArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// For boolean flags: CLI `--no-*` always wins. Config can enable/disable
    /// only when the CLI flag wasn't set.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        if !self.no_faces {
            if let Some(enabled) = config.content.faces_enabled {
                self.no_faces = !enabled;
            }
        }
        if !self.no_ocr {
            if let Some(enabled) = config.ocr.enabled {
                self.no_ocr = !enabled;
            }
        }
        self.face_size_ratio = self.face_size_ratio.or(config.content.face_size_ratio);
        self.ela_factor = self.ela_factor.or(config.forensics.ela_factor);
        if self.models_dir.is_none() {
            self.models_dir.clone_from(&config.models.dir);
        }
        self
    }

    fn model_store(&self) -> ModelStore {
        self.models_dir
            .clone()
            .map_or_else(ModelStore::default, ModelStore::new)
    }

    /// Builds the scan configuration from these args and the merged config.
    #[must_use]
    pub fn scan_config(&self, config: &AppConfig) -> ScanConfig {
        let mut scan = ScanConfig::default();
        let content = ContentConfig::default();
        scan.content.face_size_ratio = self.face_size_ratio.unwrap_or(content.face_size_ratio);

        let forensics = ForensicsConfig::default();
        scan.forensics.ela_factor = self.ela_factor.unwrap_or(forensics.ela_factor);
        scan.forensics.ela_quality = config
            .forensics
            .ela_quality
            .map_or(forensics.ela_quality, |q| q.clamp(1, 100));

        let w = RiskWeights::default();
        let r = &config.risk;
        scan.weights = RiskWeights {
            deepfake: r.weight_deepfake.unwrap_or(w.deepfake),
            gps: r.weight_gps.unwrap_or(w.gps),
            child: r.weight_child.unwrap_or(w.child),
            barcode: r.weight_barcode.unwrap_or(w.barcode),
            pii: r.weight_pii.unwrap_or(w.pii),
        };
        scan
    }

    fn face_detector(&self, config: &AppConfig) -> Arc<dyn FaceDetector> {
        if self.no_faces {
            debug!("Face detection disabled");
            return Arc::new(NoFaceDetector);
        }

        let Some(path) = self.model_store().path("blazeface") else {
            warn!("Face detection disabled: unknown model configuration.");
            return Arc::new(NoFaceDetector);
        };
        if !path.exists() {
            warn!(
                "Face detection disabled: {} not found. Run `photo-shield models fetch`.",
                path.display()
            );
            return Arc::new(NoFaceDetector);
        }

        let mut face_config = BlazeFaceConfig::new(path);
        if let Some(score) = config.content.min_face_confidence {
            face_config.min_score = score;
        }
        if let Some(size) = config.content.min_face_size {
            face_config.min_size = size;
        }
        info!("Face detection enabled");
        Arc::new(BlazeFaceDetector::new(face_config))
    }

    fn text_recognizer(&self, config: &AppConfig) -> Arc<dyn TextRecognizer> {
        if self.no_ocr {
            debug!("OCR disabled");
            return Arc::new(NoTextRecognizer);
        }
        Arc::new(TesseractRecognizer::new(
            config.ocr.command.as_deref().unwrap_or("tesseract"),
            config.ocr.language.as_deref().unwrap_or("eng"),
        ))
    }

    /// Builds a scanner wired to the real adapters.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan configuration is invalid.
    pub fn build_scanner(&self, config: &AppConfig) -> Result<Scanner> {
        let collaborators = Collaborators {
            faces: self.face_detector(config),
            barcodes: Arc::new(RxingDecoder::new()),
            text: self.text_recognizer(config),
            tags: Arc::new(ExifTagReader::new()),
        };
        Ok(Scanner::new(self.scan_config(config), collaborators)?)
    }
}

/// JPEG quality for written images: config value or the adapter default.
#[must_use]
pub fn jpeg_quality(config: &AppConfig) -> u8 {
    config
        .output
        .jpeg_quality
        .map_or(DEFAULT_JPEG_QUALITY, |q| q.clamp(1, 100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ratio() {
        assert_eq!(parse_ratio("0.25"), Ok(0.25));
        assert!(parse_ratio("1.5").is_err());
        assert!(parse_ratio("abc").is_err());
    }

    #[test]
    fn test_cli_flags_win_over_config() {
        let mut config = AppConfig::default();
        config.content.faces_enabled = Some(true);
        config.content.face_size_ratio = Some(0.4);
        config.forensics.ela_factor = Some(10);

        let args = EngineArgs {
            no_faces: true,
            face_size_ratio: Some(0.1),
            ..EngineArgs::default()
        }
        .with_config(&config);

        assert!(args.no_faces);
        assert_eq!(args.face_size_ratio, Some(0.1));
        assert_eq!(args.ela_factor, Some(10));
    }

    #[test]
    fn test_config_can_disable_ocr() {
        let mut config = AppConfig::default();
        config.ocr.enabled = Some(false);
        assert!(EngineArgs::default().with_config(&config).no_ocr);
    }

    #[test]
    fn test_scan_config_weights_and_defaults() {
        let mut config = AppConfig::default();
        config.risk.weight_gps = Some(60);
        let scan = EngineArgs::default().scan_config(&config);

        assert_eq!(scan.weights.gps, 60);
        assert_eq!(scan.weights.deepfake, 30);
        assert!((scan.content.face_size_ratio - 0.2).abs() < f32::EPSILON);
        assert_eq!(scan.forensics.ela_factor, 40);
        assert_eq!(scan.forensics.ela_quality, 90);
    }

    #[test]
    fn test_jpeg_quality_clamped() {
        let mut config = AppConfig::default();
        assert_eq!(jpeg_quality(&config), DEFAULT_JPEG_QUALITY);
        config.output.jpeg_quality = Some(0);
        assert_eq!(jpeg_quality(&config), 1);
    }
}
