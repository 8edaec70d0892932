//! Annotated preview rendering.

use image::{Rgb, RgbImage};

use super::font::{draw_text, text_size};
use crate::domain::{BoundingBox, Detection};

const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const LINE_WIDTH: u32 = 2;
/// Gap between a label and the top of its box.
const LABEL_GAP: u32 = 4;

/// Draws an outline of `LINE_WIDTH` pixels just inside `region`.
fn draw_outline(image: &mut RgbImage, region: BoundingBox) {
    for y in region.y..region.bottom() {
        for x in region.x..region.right() {
            let inner_x = x >= region.x + LINE_WIDTH && x + LINE_WIDTH < region.right();
            let inner_y = y >= region.y + LINE_WIDTH && y + LINE_WIDTH < region.bottom();
            if !(inner_x && inner_y) {
                image.put_pixel(x, y, GREEN);
            }
        }
    }
}

/// Label text for the detection at stable index `index`.
#[must_use]
pub fn label(index: usize, detection: &Detection) -> String {
    format!("ID:{index} ({})", detection.kind)
}

/// Returns a copy of `image` with every detection outlined and labelled.
#[must_use]
pub fn annotate(image: &RgbImage, detections: &[Detection], scale: u32) -> RgbImage {
    let mut out = image.clone();
    for (index, detection) in detections.iter().enumerate() {
        let Some(region) = detection.bbox.clip(out.width(), out.height()) else {
            continue;
        };
        draw_outline(&mut out, region);

        let text = label(index, detection);
        let (_, text_h) = text_size(&text, scale);
        // Above the box, or just inside its top edge when there is no room.
        let y = region
            .y
            .checked_sub(text_h + LABEL_GAP)
            .unwrap_or(region.y + LINE_WIDTH + 1);
        draw_text(
            &mut out,
            &text,
            i64::from(region.x),
            i64::from(y),
            scale,
            GREEN,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> RgbImage {
        RgbImage::from_pixel(120, 120, Rgb([40, 40, 40]))
    }

    #[test]
    fn test_label_format() {
        let d = Detection::barcode(BoundingBox::new(0, 0, 1, 1));
        assert_eq!(label(3, &d), "ID:3 (BARCODE)");
    }

    #[test]
    fn test_outline_is_two_pixels() {
        let detections = [Detection::face(BoundingBox::new(40, 60, 30, 30))];
        let out = annotate(&canvas(), &detections, 2);

        assert_eq!(out.get_pixel(40, 75).0, [0, 255, 0]);
        assert_eq!(out.get_pixel(41, 75).0, [0, 255, 0]);
        assert_eq!(out.get_pixel(42, 75).0, [40, 40, 40]);
        assert_eq!(out.get_pixel(69, 75).0, [0, 255, 0]);
        assert_eq!(out.get_pixel(55, 75).0, [40, 40, 40]);
        // Label sits above the box.
        assert!((40..60).any(|y| (40..100).any(|x| out.get_pixel(x, y).0 == [0, 255, 0])));
    }

    #[test]
    fn test_preview_is_non_destructive_and_idempotent() {
        let input = canvas();
        let detections = [
            Detection::face(BoundingBox::new(5, 2, 30, 30)),
            Detection::barcode(BoundingBox::new(100, 100, 50, 50)),
        ];
        let a = annotate(&input, &detections, 2);
        let b = annotate(&input, &detections, 2);

        assert_eq!(a, b);
        assert!(input.pixels().all(|p| p.0 == [40, 40, 40]));
        assert_eq!(a.dimensions(), input.dimensions());
    }

    #[test]
    fn test_no_detections_is_a_copy() {
        let input = canvas();
        assert_eq!(annotate(&input, &[], 2), input);
    }
}
