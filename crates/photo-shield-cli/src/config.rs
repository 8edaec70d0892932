//! Configuration file support for photo-shield.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/photo-shield/config.toml` (lowest priority)
//! - Project-local: `.photo-shield.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    /// Face, barcode and close-up settings.
    pub content: ContentConfig,
    pub forensics: ForensicsConfig,
    /// Score deductions.
    pub risk: RiskConfig,
    pub ocr: OcrConfig,
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Face height over image height above which a face is a close-up (0.0-1.0).
    pub face_size_ratio: Option<f32>,
    /// Enable/disable face detection.
    pub faces_enabled: Option<bool>,
    /// Minimum face detection confidence (0.0-1.0).
    pub min_face_confidence: Option<f32>,
    /// Minimum face side in pixels.
    pub min_face_size: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ForensicsConfig {
    /// Largest recompression difference that still counts as clean.
    pub ela_factor: Option<u8>,
    /// JPEG quality of the recompression pass (1-100).
    pub ela_quality: Option<u8>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub weight_deepfake: Option<u8>,
    pub weight_gps: Option<u8>,
    pub weight_child: Option<u8>,
    pub weight_barcode: Option<u8>,
    pub weight_pii: Option<u8>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Enable/disable OCR.
    pub enabled: Option<bool>,
    /// OCR executable.
    pub command: Option<String>,
    /// Tesseract language code.
    pub language: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, e.g. `127.0.0.1:8000`.
    pub bind: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Custom models directory path.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
    /// Quality of written JPEGs (1-100).
    pub jpeg_quality: Option<u8>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/photo-shield/config.toml`
    /// 2. Project-local: `.photo-shield.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are reported as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for warning in config.validate() {
            eprintln!("warning: {warning}");
        }

        config
    }

    /// Reports values outside their accepted ranges.
    fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let unit = [
            ("content.face_size_ratio", self.content.face_size_ratio),
            ("content.min_face_confidence", self.content.min_face_confidence),
        ];
        for (name, value) in unit {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    warnings.push(format!("{name} must be 0.0-1.0, got {v}"));
                }
            }
        }

        let quality = [
            ("forensics.ela_quality", self.forensics.ela_quality),
            ("output.jpeg_quality", self.output.jpeg_quality),
        ];
        for (name, value) in quality {
            if let Some(q) = value {
                if !(1..=100).contains(&q) {
                    warnings.push(format!("{name} must be 1-100, got {q}"));
                }
            }
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                warnings.push(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        warnings
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        let c = &mut self.content;
        c.face_size_ratio = other.content.face_size_ratio.or(c.face_size_ratio);
        c.faces_enabled = other.content.faces_enabled.or(c.faces_enabled);
        c.min_face_confidence = other.content.min_face_confidence.or(c.min_face_confidence);
        c.min_face_size = other.content.min_face_size.or(c.min_face_size);

        let f = &mut self.forensics;
        f.ela_factor = other.forensics.ela_factor.or(f.ela_factor);
        f.ela_quality = other.forensics.ela_quality.or(f.ela_quality);

        let r = &mut self.risk;
        r.weight_deepfake = other.risk.weight_deepfake.or(r.weight_deepfake);
        r.weight_gps = other.risk.weight_gps.or(r.weight_gps);
        r.weight_child = other.risk.weight_child.or(r.weight_child);
        r.weight_barcode = other.risk.weight_barcode.or(r.weight_barcode);
        r.weight_pii = other.risk.weight_pii.or(r.weight_pii);

        self.ocr.enabled = other.ocr.enabled.or(self.ocr.enabled);
        self.ocr.command = other.ocr.command.or_else(|| self.ocr.command.take());
        self.ocr.language = other.ocr.language.or_else(|| self.ocr.language.take());

        self.server.bind = other.server.bind.or_else(|| self.server.bind.take());
        self.models.dir = other.models.dir.or_else(|| self.models.dir.take());

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
        self.output.jpeg_quality = other.output.jpeg_quality.or(self.output.jpeg_quality);
    }
}

fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("photo-shield").join("config.toml"))
}

fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.photo-shield.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".photo-shield.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config: AppConfig = toml::from_str("").expect("parse empty config");
        assert!(config.content.face_size_ratio.is_none());
        assert!(config.ocr.enabled.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r"
[general]
recursive = true

[content]
face_size_ratio = 0.25
faces_enabled = false
min_face_confidence = 0.8
min_face_size = 40

[forensics]
ela_factor = 35
ela_quality = 85

[risk]
weight_deepfake = 40
weight_gps = 20
weight_child = 25
weight_barcode = 5
weight_pii = 10

[ocr]
enabled = true
command = '/usr/local/bin/tesseract'
language = 'deu'

[server]
bind = '0.0.0.0:9000'

[models]
dir = '/opt/models'

[output]
format = 'json'
pretty = true
progress = false
jpeg_quality = 90
";
        let config: AppConfig = toml::from_str(toml).expect("parse full config");

        assert_eq!(config.general.recursive, Some(true));
        assert_eq!(config.content.face_size_ratio, Some(0.25));
        assert_eq!(config.content.faces_enabled, Some(false));
        assert_eq!(config.content.min_face_size, Some(40));
        assert_eq!(config.forensics.ela_factor, Some(35));
        assert_eq!(config.risk.weight_barcode, Some(5));
        assert_eq!(config.ocr.language.as_deref(), Some("deu"));
        assert_eq!(config.server.bind.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(config.models.dir, Some(PathBuf::from("/opt/models")));
        assert_eq!(config.output.format, Some("json".to_string()));
        assert_eq!(config.output.jpeg_quality, Some(90));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_merge_preserves_base_when_override_is_none() {
        let mut base: AppConfig = toml::from_str(
            r"
[content]
face_size_ratio = 0.3
min_face_size = 20

[risk]
weight_gps = 50
",
        )
        .expect("parse base");

        let override_config: AppConfig = toml::from_str(
            r"
[content]
face_size_ratio = 0.1

[ocr]
enabled = false
",
        )
        .expect("parse override");

        base.merge(override_config);

        assert_eq!(base.content.face_size_ratio, Some(0.1));
        assert_eq!(base.content.min_face_size, Some(20));
        assert_eq!(base.risk.weight_gps, Some(50));
        assert_eq!(base.ocr.enabled, Some(false));
    }

    #[test]
    fn test_merge_strings_and_paths() {
        let mut base: AppConfig = toml::from_str(
            r"
[ocr]
command = 'tesseract'

[models]
dir = '/a'
",
        )
        .expect("parse base");
        base.merge(
            toml::from_str(
                r"
[models]
dir = '/b'
",
            )
            .expect("parse override"),
        );

        assert_eq!(base.ocr.command.as_deref(), Some("tesseract"));
        assert_eq!(base.models.dir, Some(PathBuf::from("/b")));
    }

    #[test]
    fn test_invalid_field_type_handled() {
        let toml = r#"
[content]
face_size_ratio = "big"
"#;
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut config = AppConfig::default();
        config.content.face_size_ratio = Some(1.5);
        config.forensics.ela_quality = Some(0);
        config.output.format = Some("xml".to_string());

        let warnings = config.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("content.face_size_ratio"));
        assert!(warnings[1].contains("forensics.ela_quality"));
        assert!(warnings[2].contains("output.format"));
    }

    #[test]
    fn test_find_config_in_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".photo-shield.toml"), "").unwrap();

        assert_eq!(
            find_config_in_parents(&nested),
            Some(dir.path().join(".photo-shield.toml"))
        );
    }
}
