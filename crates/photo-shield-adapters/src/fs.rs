//! Filesystem adapter for loading and writing images.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};
use photo_shield_core::{ImageInfo, ImageSource};
use tempfile::TempPath;
use tracing::{debug, warn};

/// Supported image extensions.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Default quality for JPEG output.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Filesystem image source adapter.
pub struct FsImageSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsImageSource {
    /// Creates a new filesystem image source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Collects all image files from the configured paths.
    ///
    /// Directory contents are sorted so batch output order is stable.
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                if is_supported_image(path) {
                    files.push(path.clone());
                } else {
                    warn!("Unsupported file type: {}", path.display());
                }
            } else if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_file() && is_supported_image(&path) {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl ImageSource for FsImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} image files", files.len());

        Box::new(files.into_iter().map(|path| load_image(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// Checks if a path has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Loads an image from the filesystem.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_image(path: &Path) -> Result<ImageInfo> {
    let image =
        image::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;
    Ok(ImageInfo::new(path.to_string_lossy(), image))
}

/// Decodes uploaded bytes and keeps a copy on disk for metadata reading.
///
/// The copy is named with the detected format's extension and deleted when
/// the returned [`TempPath`] is dropped.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image or the copy
/// cannot be written.
pub fn load_upload(bytes: &[u8]) -> Result<(ImageInfo, TempPath)> {
    let format = image::guess_format(bytes).context("Unrecognized image format")?;
    let image = image::load_from_memory_with_format(bytes, format)
        .context("Failed to decode uploaded image")?;

    let suffix = format
        .extensions_str()
        .first()
        .map_or_else(String::new, |ext| format!(".{ext}"));
    let mut file = tempfile::Builder::new()
        .prefix("photo-shield-upload-")
        .suffix(&suffix)
        .tempfile()
        .context("Failed to create upload file")?;
    file.write_all(bytes).context("Failed to store upload")?;
    let path = file.into_temp_path();

    debug!("Stored {} byte upload at {}", bytes.len(), path.display());
    Ok((ImageInfo::new(path.to_string_lossy(), image), path))
}

/// Encodes pixels as JPEG.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_jpeg(pixels: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(Cursor::new(&mut out), quality.clamp(1, 100))
        .write_image(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgb8,
        )
        .context("Failed to encode JPEG")?;
    Ok(out)
}

/// Writes pixels to `path`, choosing the format from its extension.
///
/// JPEG output uses `quality`; other formats ignore it.
///
/// # Errors
///
/// Returns an error if the extension is unknown or writing fails.
pub fn save_image(pixels: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("Unknown output format: {}", path.display()))?;

    if format == ImageFormat::Jpeg {
        let bytes = encode_jpeg(pixels, quality)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        pixels
            .save_with_format(path, format)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    debug!("Wrote {}", path.display());
    Ok(())
}
