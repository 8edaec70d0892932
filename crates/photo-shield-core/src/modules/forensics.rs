//! Image forensics: recompression error, lighting distribution, reflections.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};
use tracing::debug;

use super::Histogram;
use crate::domain::{ForensicsReport, ImageInfo, LightingClass};

/// Configuration for the forensics analyzer.
#[derive(Debug, Clone)]
pub struct ForensicsConfig {
    /// Largest per-channel recompression difference that still counts as clean.
    pub ela_factor: u8,
    /// JPEG quality used for the recompression pass (1-100).
    pub ela_quality: u8,
    /// Brightness values below this count as dark.
    pub dark_limit: u8,
    /// Brightness values at or above this count as bright.
    pub bright_floor: u8,
    /// Fraction of extreme pixels above which lighting is flagged.
    pub extreme_fraction: f64,
    /// Luma values strictly above this count as specular highlights.
    pub highlight_level: u8,
    /// Exclusive lower bound on the highlight count for reflections.
    pub min_highlights: u64,
    /// Exclusive upper bound on the highlight count for reflections.
    pub max_highlights: u64,
}

impl Default for ForensicsConfig {
    fn default() -> Self {
        Self {
            ela_factor: 40,
            ela_quality: 90,
            dark_limit: 20,
            bright_floor: 235,
            extreme_fraction: 0.8,
            highlight_level: 240,
            min_highlights: 50,
            max_highlights: 5000,
        }
    }
}

/// Runs the three forensic checks. Never mutates its input.
#[derive(Debug, Clone, Default)]
pub struct ForensicsAnalyzer {
    config: ForensicsConfig,
}

impl ForensicsAnalyzer {
    #[must_use]
    pub const fn new(config: ForensicsConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ForensicsConfig {
        &self.config
    }

    /// Runs every check.
    ///
    /// # Errors
    ///
    /// Returns an error if the recompression pass fails.
    pub fn analyze(&self, image: &ImageInfo) -> Result<ForensicsReport> {
        Ok(ForensicsReport {
            compression_anomaly: self.analyze_compression(image)?,
            lighting: self.analyze_lighting(image),
            reflection_present: self.detect_reflections(image),
        })
    }

    /// Error level analysis.
    ///
    /// Re-encodes the image as JPEG, decodes it again and returns true if any
    /// channel of any pixel moved by more than the ELA factor.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or decoding fails.
    pub fn analyze_compression(&self, image: &ImageInfo) -> Result<bool> {
        if image.width == 0 || image.height == 0 {
            return Ok(false);
        }

        let recompressed = recompress(&image.pixels, self.config.ela_quality)?;
        let max_diff = max_channel_difference(&image.pixels, &recompressed);
        debug!(
            "ELA on {}: max channel diff {} (factor {})",
            image.path, max_diff, self.config.ela_factor
        );

        Ok(max_diff > self.config.ela_factor)
    }

    /// Classifies the brightness distribution using the HSV value channel.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn analyze_lighting(&self, image: &ImageInfo) -> LightingClass {
        let hist = Histogram::from_luma(&image.to_value_channel());
        let extremes = hist.count_under(self.config.dark_limit)
            + hist.count_from(self.config.bright_floor);

        debug!(
            "Lighting on {}: {} of {} pixels at extremes, mean {:.1}",
            image.path,
            extremes,
            hist.total(),
            hist.mean()
        );

        if extremes as f64 > self.config.extreme_fraction * hist.total() as f64 {
            LightingClass::ArtificialOrBad
        } else {
            LightingClass::Natural
        }
    }

    /// Returns true for a moderate number of specular highlights.
    ///
    /// Too few is noise; too many is a bright scene rather than reflections.
    #[must_use]
    pub fn detect_reflections(&self, image: &ImageInfo) -> bool {
        let hist = Histogram::from_luma(&image.to_luma8());
        let highlights = hist.count_over(self.config.highlight_level);
        debug!("Reflections on {}: {} highlight pixels", image.path, highlights);

        highlights > self.config.min_highlights && highlights < self.config.max_highlights
    }
}

fn recompress(pixels: &RgbImage, quality: u8) -> Result<RgbImage> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .write_image(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgb8,
        )
        .context("Failed to re-encode image for ELA")?;

    let decoded = image::load(Cursor::new(buf), ImageFormat::Jpeg)
        .context("Failed to decode re-encoded image")?;
    Ok(decoded.to_rgb8())
}

fn max_channel_difference(a: &RgbImage, b: &RgbImage) -> u8 {
    a.as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gray(width: u32, height: u32, value: u8) -> ImageInfo {
        ImageInfo::from_rgb(
            "gray.png",
            RgbImage::from_pixel(width, height, Rgb([value; 3])),
        )
    }

    /// Sets the first `count` pixels (row-major) to `value`.
    fn with_bright_pixels(mut info: ImageInfo, count: u32, value: u8) -> ImageInfo {
        for i in 0..count {
            let (x, y) = (i % info.width, i / info.width);
            info.pixels.put_pixel(x, y, Rgb([value; 3]));
        }
        info
    }

    #[test]
    fn test_default_config() {
        let config = ForensicsConfig::default();
        assert_eq!(config.ela_factor, 40);
        assert_eq!(config.ela_quality, 90);
        assert_eq!(config.highlight_level, 240);
    }

    #[test]
    fn test_uniform_gray_is_natural() {
        let analyzer = ForensicsAnalyzer::default();
        assert_eq!(
            analyzer.analyze_lighting(&gray(100, 100, 128)),
            LightingClass::Natural
        );
    }

    #[test]
    fn test_extremes_are_artificial() {
        // 90% black, 10% white.
        let info = with_bright_pixels(gray(100, 100, 0), 1000, 255);
        let analyzer = ForensicsAnalyzer::default();
        assert_eq!(
            analyzer.analyze_lighting(&info),
            LightingClass::ArtificialOrBad
        );
    }

    #[test]
    fn test_lighting_exactly_at_fraction_is_natural() {
        // 80% black is not strictly above the fraction.
        let info = with_bright_pixels(gray(100, 100, 0), 2000, 128);
        let analyzer = ForensicsAnalyzer::default();
        assert_eq!(analyzer.analyze_lighting(&info), LightingClass::Natural);
    }

    #[test]
    fn test_lighting_uses_channel_max() {
        // Saturated red has low luma but full value.
        let info = ImageInfo::from_rgb("red.png", RgbImage::from_pixel(50, 50, Rgb([255, 0, 0])));
        let analyzer = ForensicsAnalyzer::default();
        assert_eq!(
            analyzer.analyze_lighting(&info),
            LightingClass::ArtificialOrBad
        );
    }

    #[test]
    fn test_reflection_window() {
        let analyzer = ForensicsAnalyzer::default();
        let base = || gray(200, 200, 100);

        assert!(!analyzer.detect_reflections(&base()));
        assert!(analyzer.detect_reflections(&with_bright_pixels(base(), 100, 255)));
        assert!(!analyzer.detect_reflections(&with_bright_pixels(base(), 6000, 255)));
        assert!(!analyzer.detect_reflections(&with_bright_pixels(base(), 50, 255)));
    }

    #[test]
    fn test_reflection_threshold_is_strict() {
        // 240 is not above 240.
        let analyzer = ForensicsAnalyzer::default();
        let info = with_bright_pixels(gray(200, 200, 100), 100, 240);
        assert!(!analyzer.detect_reflections(&info));
    }

    #[test]
    fn test_uniform_image_survives_recompression() {
        let analyzer = ForensicsAnalyzer::default();
        let anomaly = analyzer
            .analyze_compression(&gray(64, 64, 128))
            .expect("ELA should succeed");
        assert!(!anomaly);
    }

    #[test]
    fn test_zero_factor_flags_any_change() {
        let pixels = RgbImage::from_fn(64, 64, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let info = ImageInfo::from_rgb("checker.png", pixels);
        let analyzer = ForensicsAnalyzer::new(ForensicsConfig {
            ela_factor: 0,
            ..Default::default()
        });
        assert!(analyzer.analyze_compression(&info).unwrap());
    }

    #[test]
    fn test_analyze_does_not_mutate() {
        let info = with_bright_pixels(gray(100, 100, 30), 200, 255);
        let before = info.pixels.clone();
        let _ = ForensicsAnalyzer::default().analyze(&info).unwrap();
        assert_eq!(info.pixels, before);
    }
}
