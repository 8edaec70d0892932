//! Gaussian blur restricted to a rectangle.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]

use image::RgbImage;

use crate::domain::BoundingBox;

/// Odd kernel size derived from the region width.
#[must_use]
pub const fn kernel_size(width: u32) -> usize {
    ((width / 2) | 1) as usize
}

/// Normalized 1-D Gaussian weights.
fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f64> {
    let radius = (size / 2) as f64;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - radius;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Mirrors an out-of-range index back into `0..n` without repeating the edge
/// sample (`dcb|abcd|cba`).
fn reflect_101(i: isize, n: isize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * n - 2;
    let i = i.rem_euclid(period);
    (if i >= n { period - i } else { i }) as usize
}

/// Blurs the pixels inside `region`, which must already be clipped to the
/// image. Only pixels from inside the region are sampled.
pub fn blur_region(image: &mut RgbImage, region: BoundingBox, sigma: f64) {
    let (w, h) = (region.width as usize, region.height as usize);
    if w == 0 || h == 0 {
        return;
    }

    let size = kernel_size(region.width);
    let kernel = gaussian_kernel(size, sigma);
    let radius = (size / 2) as isize;

    let mut src = vec![0.0_f64; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let p = image.get_pixel(region.x + x as u32, region.y + y as u32).0;
            for c in 0..3 {
                src[(y * w + x) * 3 + c] = f64::from(p[c]);
            }
        }
    }

    let mut tmp = vec![0.0_f64; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            for c in 0..3 {
                tmp[(y * w + x) * 3 + c] = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, weight)| {
                        let sx = reflect_101(x as isize + k as isize - radius, w as isize);
                        weight * src[(y * w + sx) * 3 + c]
                    })
                    .sum();
            }
        }
    }

    for y in 0..h {
        for x in 0..w {
            let mut out = [0u8; 3];
            for (c, v) in out.iter_mut().enumerate() {
                let acc: f64 = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, weight)| {
                        let sy = reflect_101(y as isize + k as isize - radius, h as isize);
                        weight * tmp[(sy * w + x) * 3 + c]
                    })
                    .sum();
                *v = acc.round().clamp(0.0, 255.0) as u8;
            }
            image.put_pixel(region.x + x as u32, region.y + y as u32, image::Rgb(out));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_kernel_size_is_odd() {
        assert_eq!(kernel_size(100), 51);
        assert_eq!(kernel_size(40), 21);
        assert_eq!(kernel_size(1), 1);
        assert_eq!(kernel_size(0), 1);
    }

    #[test]
    fn test_kernel_normalized() {
        let k = gaussian_kernel(21, 30.0);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(k[10] > k[0]);
    }

    #[test]
    fn test_reflect_101() {
        let got: Vec<usize> = (-3..7).map(|i| reflect_101(i, 4)).collect();
        assert_eq!(got, vec![3, 2, 1, 0, 1, 2, 3, 2, 1, 0]);
        assert_eq!(reflect_101(-5, 1), 0);
    }

    #[test]
    fn test_blur_uniform_region_unchanged() {
        let mut img = RgbImage::from_pixel(20, 20, Rgb([90, 120, 150]));
        blur_region(&mut img, BoundingBox::new(2, 2, 10, 10), 30.0);
        assert!(img.pixels().all(|p| p.0 == [90, 120, 150]));
    }

    #[test]
    fn test_blur_only_touches_region() {
        let mut img = RgbImage::from_fn(40, 40, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let before = img.clone();
        let region = BoundingBox::new(10, 10, 20, 20);
        blur_region(&mut img, region, 30.0);

        for (x, y, p) in img.enumerate_pixels() {
            if !region.contains(x, y) {
                assert_eq!(p, before.get_pixel(x, y), "pixel ({x},{y}) changed");
            }
        }
        let centre = img.get_pixel(20, 20).0[0];
        assert!(centre > 60 && centre < 200, "centre={centre}");
    }
}
