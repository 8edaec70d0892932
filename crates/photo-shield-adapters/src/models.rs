//! Model downloading and caching adapter.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Model metadata.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name/identifier.
    pub name: &'static str,
    /// Download URL.
    pub url: &'static str,
    /// Expected SHA-256 of the file, when published.
    pub sha256: Option<&'static str>,
    /// Filename in the models directory.
    pub filename: &'static str,
}

/// Known models.
pub const MODELS: &[ModelInfo] = &[ModelInfo {
    name: "blazeface",
    url: "https://github.com/photo-shield/photo-shield/releases/download/models-v1/blazeface.safetensors",
    sha256: None,
    filename: "blazeface.safetensors",
}];

/// Looks up a known model by name.
#[must_use]
pub fn model_info(name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.name == name)
}

/// Default models directory.
///
/// Uses `XDG_DATA_HOME/photo-shield/models` or `~/.local/share/photo-shield/models`.
#[must_use]
pub fn models_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("photo-shield")
        .join("models")
}

/// A directory of downloaded model weights.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(models_dir())
    }
}

impl ModelStore {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a model is (or would be) stored at.
    #[must_use]
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        model_info(name).map(|m| self.dir.join(m.filename))
    }

    #[must_use]
    pub fn is_installed(&self, name: &str) -> bool {
        self.path(name).is_some_and(|p| p.exists())
    }

    /// Lists known models with their installed status.
    #[must_use]
    pub fn list(&self) -> Vec<(&'static str, bool)> {
        MODELS
            .iter()
            .map(|m| (m.name, self.dir.join(m.filename).exists()))
            .collect()
    }

    /// Downloads a model unless it is already present.
    ///
    /// `on_progress` receives `(downloaded, total)` byte counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is unknown, the download fails or the
    /// checksum does not match.
    pub fn ensure(
        &self,
        name: &str,
        force: bool,
        on_progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<PathBuf> {
        let model = model_info(name).with_context(|| format!("Unknown model: {name}"))?;
        let path = self.dir.join(model.filename);
        if path.exists() && !force {
            debug!("Model {} already exists", model.name);
            return Ok(path);
        }

        fs::create_dir_all(&self.dir).context("Failed to create models directory")?;
        download_model(model, &path, on_progress)?;
        Ok(path)
    }
}

/// Streams a model to a temporary file beside `path`, verifies it, then
/// moves it into place.
fn download_model(
    model: &ModelInfo,
    path: &Path,
    on_progress: &mut dyn FnMut(u64, Option<u64>),
) -> Result<()> {
    info!("Downloading model: {}", model.name);

    let mut response = reqwest::blocking::get(model.url)
        .with_context(|| format!("Failed to download {}", model.name))?;

    if !response.status().is_success() {
        bail!("Download failed with status: {}", response.status());
    }

    let total = response.content_length();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create download file in {}", dir.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    let mut downloaded = 0u64;

    loop {
        let n = response
            .read(&mut buf)
            .with_context(|| format!("Failed to read response for {}", model.name))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        file.write_all(&buf[..n])
            .with_context(|| format!("Failed to write {}", model.name))?;
        downloaded += n as u64;
        on_progress(downloaded, total);
    }

    let hash = format!("{:x}", hasher.finalize());
    match model.sha256 {
        Some(expected) if expected != hash => bail!(
            "Checksum mismatch for {}: expected {}, got {}. \
             Try deleting {} and re-running to download a fresh copy.",
            model.name,
            expected,
            hash,
            path.display()
        ),
        Some(_) => {}
        None => debug!("No published checksum for {}; got {}", model.name, hash),
    }

    file.persist(path)
        .with_context(|| format!("Failed to move {} into place", model.name))?;

    info!("Downloaded {} ({} bytes)", model.name, downloaded);
    Ok(())
}
