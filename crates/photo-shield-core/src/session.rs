//! The single-image working set behind scan, protect and preview.

use anyhow::Result;
use image::RgbImage;
use rand::Rng;
use tempfile::TempPath;
use tracing::{debug, info};

use crate::domain::{
    DetectionSet, DetectionToken, ImageInfo, ProtectAction, ProtectRequest, ScanReport,
};
use crate::error::ShieldError;
use crate::pipeline::Scanner;

/// The current image and what is known about it.
struct Current {
    image: ImageInfo,
    /// Detections from the last scan and the token they were issued under.
    cached: Option<(DetectionToken, DetectionSet)>,
    /// Keeps an uploaded file alive while it is the current image.
    _backing: Option<TempPath>,
}

/// Holds at most one image. Loading a new image replaces the old one and
/// drops its cached detections.
#[derive(Default)]
pub struct Session {
    current: Option<Current>,
}

impl Session {
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Replaces the current image. `backing` is the on-disk copy metadata is
    /// read from, deleted when the image is replaced.
    pub fn load(&mut self, image: ImageInfo, backing: Option<TempPath>) {
        info!("Session image is now {}", image.path);
        self.current = Some(Current {
            image,
            cached: None,
            _backing: backing,
        });
    }

    #[must_use]
    pub fn image(&self) -> Option<&ImageInfo> {
        self.current.as_ref().map(|c| &c.image)
    }

    fn current_mut(&mut self) -> Result<&mut Current, ShieldError> {
        self.current.as_mut().ok_or(ShieldError::NoImage)
    }

    /// Scans the current image and caches its detections.
    ///
    /// # Errors
    ///
    /// Returns [`ShieldError::NoImage`] or any scan failure.
    pub fn scan(&mut self, scanner: &Scanner) -> Result<ScanReport> {
        let current = self.current_mut()?;
        let outcome = scanner.scan(&current.image)?;
        current.cached = Some((outcome.report.detection_token.clone(), outcome.detections));
        Ok(outcome.report)
    }

    /// Loads `image` and scans it.
    ///
    /// # Errors
    ///
    /// Returns any scan failure. The image stays loaded either way.
    pub fn upload(
        &mut self,
        scanner: &Scanner,
        image: ImageInfo,
        backing: Option<TempPath>,
    ) -> Result<ScanReport> {
        self.load(image, backing);
        self.scan(scanner)
    }

    /// Resolves the detections a request refers to.
    ///
    /// With a token: it must match the current image, then the cache is
    /// used when it holds that token. Without one, detection runs again.
    fn detections(
        current: &mut Current,
        scanner: &Scanner,
        token: Option<&DetectionToken>,
    ) -> Result<DetectionSet> {
        let expected = scanner.token_for(&current.image);
        if let Some(given) = token {
            if *given != expected {
                return Err(ShieldError::StaleDetections {
                    given: given.to_string(),
                }
                .into());
            }
            if let Some((cached_token, set)) = &current.cached {
                if *cached_token == expected {
                    debug!("Reusing cached detections for {}", current.image.path);
                    return Ok(set.clone());
                }
            }
        }

        let set = scanner.detect(&current.image)?;
        current.cached = Some((expected, set.clone()));
        Ok(set)
    }

    /// Applies a protect request to a copy of the current image.
    ///
    /// # Errors
    ///
    /// Returns [`ShieldError::NoImage`], [`ShieldError::StaleDetections`] or
    /// a detection failure.
    pub fn protect(&mut self, scanner: &Scanner, request: &ProtectRequest) -> Result<RgbImage> {
        self.protect_with_rng(scanner, request, &mut rand::thread_rng())
    }

    /// [`Self::protect`] with a caller-supplied noise source.
    ///
    /// # Errors
    ///
    /// See [`Self::protect`].
    pub fn protect_with_rng<R: Rng + ?Sized>(
        &mut self,
        scanner: &Scanner,
        request: &ProtectRequest,
        rng: &mut R,
    ) -> Result<RgbImage> {
        let current = self.current_mut()?;
        let set = Self::detections(current, scanner, request.token.as_ref())?;
        let mut pixels = current.image.pixels.clone();
        let transformer = scanner.transformer();

        match request.action {
            ProtectAction::BlurSelected => {
                let selected = set.select(&request.indices);
                debug!(
                    "Redacting {} of {} requested detections",
                    selected.len(),
                    request.indices.len()
                );
                transformer.redact(&mut pixels, &selected);
            }
            ProtectAction::Cloak => transformer.cloak_faces(&mut pixels, &set.faces, rng),
        }

        Ok(pixels)
    }

    /// Annotated copy of the current image.
    ///
    /// # Errors
    ///
    /// Returns [`ShieldError::NoImage`] or a detection failure.
    pub fn preview(&mut self, scanner: &Scanner) -> Result<RgbImage> {
        let current = self.current_mut()?;
        let expected = scanner.token_for(&current.image);
        let set = Self::detections(current, scanner, Some(&expected))?;
        Ok(scanner
            .transformer()
            .annotate_preview(&current.image.pixels, &set.to_vec()))
    }
}
