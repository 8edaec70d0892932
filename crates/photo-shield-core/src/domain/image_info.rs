//! Canonical in-memory image representation.

use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates a new dimensions value.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A decoded image held as 8-bit RGB.
///
/// Every analyzer and transform in the core works on this one pixel layout.
/// Conversion from whatever the file contained happens once, in [`ImageInfo::new`].
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Path of the file the image was read from. Metadata is read from here.
    pub path: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel buffer.
    pub pixels: RgbImage,
}

impl ImageInfo {
    /// Wraps a decoded image, converting it to RGB8.
    #[must_use]
    pub fn new(path: impl Into<String>, image: DynamicImage) -> Self {
        Self::from_rgb(path, image.to_rgb8())
    }

    /// Wraps an RGB buffer as-is.
    #[must_use]
    pub fn from_rgb(path: impl Into<String>, pixels: RgbImage) -> Self {
        Self {
            path: path.into(),
            width: pixels.width(),
            height: pixels.height(),
            pixels,
        }
    }

    /// Returns the image dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.width, self.height)
    }

    /// Grayscale (luma) view of the pixels.
    #[must_use]
    pub fn to_luma8(&self) -> GrayImage {
        image::imageops::grayscale(&self.pixels)
    }

    /// HSV value channel, `max(r, g, b)` per pixel.
    #[must_use]
    pub fn to_value_channel(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b] = self.pixels.get_pixel(x, y).0;
            image::Luma([r.max(g).max(b)])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_converts_to_rgb() {
        let gray = image::GrayImage::from_fn(4, 3, |_, _| image::Luma([77u8]));
        let info = ImageInfo::new("gray.png", DynamicImage::ImageLuma8(gray));

        assert_eq!(info.dimensions(), ImageDimensions::new(4, 3));
        assert_eq!(info.pixels.get_pixel(2, 1).0, [77, 77, 77]);
    }

    #[test]
    fn test_value_channel_is_channel_max() {
        let rgb = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgb([10, 200, 30])
            } else {
                image::Rgb([250, 0, 0])
            }
        });
        let info = ImageInfo::from_rgb("rgb.png", rgb);
        let value = info.to_value_channel();

        assert_eq!(value.get_pixel(0, 0).0[0], 200);
        assert_eq!(value.get_pixel(1, 0).0[0], 250);
    }
}
