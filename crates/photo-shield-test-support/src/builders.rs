//! Synthetic images for tests.

use image::{Rgb, RgbImage};
use photo_shield_core::domain::ImageInfo;

/// Builder for synthetic test images with known pixel statistics.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// Uniform gray image.
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> ImageInfo {
        Self::rgb_uniform(width, height, value, value, value)
    }

    /// Uniform color image.
    #[must_use]
    pub fn rgb_uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> ImageInfo {
        ImageInfo::from_rgb(
            "synthetic://uniform",
            RgbImage::from_pixel(width, height, Rgb([r, g, b])),
        )
    }

    /// Black and white checkerboard with 8-pixel cells.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> ImageInfo {
        Self::checkerboard_with_cell_size(width, height, 8)
    }

    /// Black and white checkerboard with custom cell size. Top-left is white.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell_size: u32) -> ImageInfo {
        let cell = cell_size.max(1);
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgb([255; 3])
            } else {
                Rgb([0; 3])
            }
        });
        ImageInfo::from_rgb("synthetic://checkerboard", img)
    }

    /// Mid-gray image with the first `count` pixels (row-major) set to white.
    #[must_use]
    pub fn with_bright_pixels(width: u32, height: u32, count: u32) -> ImageInfo {
        let mut info = Self::uniform_gray(width, height, 100);
        let total = width.saturating_mul(height);
        for i in 0..count.min(total) {
            info.pixels.put_pixel(i % width, i / width, Rgb([255; 3]));
        }
        info.path = "synthetic://bright_pixels".into();
        info
    }

    /// Image whose rows are black except the bottom `bright_percent`% which are white.
    #[must_use]
    pub fn extremes(width: u32, height: u32, bright_percent: u32) -> ImageInfo {
        let bright_from = height - height * bright_percent.min(100) / 100;
        let img = RgbImage::from_fn(width, height, |_, y| {
            if y >= bright_from {
                Rgb([255; 3])
            } else {
                Rgb([0; 3])
            }
        });
        ImageInfo::from_rgb("synthetic://extremes", img)
    }

    /// Smooth diagonal color gradient; survives JPEG recompression well.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn gradient(width: u32, height: u32) -> ImageInfo {
        let (w, h) = (width.max(1), height.max(1));
        let img = RgbImage::from_fn(width, height, |x, y| {
            let r = (60 + x * 120 / w) as u8;
            let g = (60 + y * 120 / h) as u8;
            Rgb([r, g, 128])
        });
        ImageInfo::from_rgb("synthetic://gradient", img)
    }

    /// Standard clean test image: 128x128 mid-gray.
    #[must_use]
    pub fn clean_image() -> ImageInfo {
        Self::uniform_gray(128, 128, 128)
    }

    /// Returns `info` with a different source path.
    #[must_use]
    pub fn at_path(mut info: ImageInfo, path: impl Into<String>) -> ImageInfo {
        info.path = path.into();
        info
    }
}
