//! Integration tests for EXIF tag reading on real files.

#![allow(clippy::unwrap_used)]

use image::RgbImage;
use photo_shield_adapters::ExifTagReader;
use photo_shield_core::modules::report_from_tags;
use photo_shield_core::ports::keys;
use photo_shield_core::{TagReader, TagValue};
use photo_shield_test_support::{Dms, ExifJpegBuilder};

#[test]
fn test_reads_make_model_and_gps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tagged.jpg");
    ExifJpegBuilder::new(RgbImage::new(16, 16))
        .make("Canon")
        .model("EOS R5")
        .gps(Dms::new(40, 26, 46, 'N'), Dms::new(79, 58, 56, 'W'))
        .write_to(&path)
        .unwrap();

    let tags = ExifTagReader::new()
        .read_tags(path.to_str().unwrap())
        .unwrap()
        .unwrap();

    assert!(tags.contains_key(keys::GPS_INFO));
    assert_eq!(
        tags.get(keys::MAKE),
        Some(&TagValue::Text("Canon".into()))
    );
    assert_eq!(
        tags.get(keys::GPS_LATITUDE).and_then(TagValue::as_numbers),
        Some(&[40.0, 26.0, 46.0][..])
    );

    let report = report_from_tags(&tags);
    assert!(report.gps_found);
    assert_eq!(report.device_info, "EOS R5");
    assert!(report.lon.unwrap() < 0.0);
}

#[test]
fn test_make_only_without_gps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("make.jpg");
    ExifJpegBuilder::new(RgbImage::new(16, 16))
        .make("Nikon")
        .write_to(&path)
        .unwrap();

    let tags = ExifTagReader::new()
        .read_tags(path.to_str().unwrap())
        .unwrap()
        .unwrap();
    let report = report_from_tags(&tags);
    assert!(!report.gps_found);
    assert_eq!(report.device_info, "Nikon");
}

#[test]
fn test_plain_png_has_no_tags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.png");
    RgbImage::new(8, 8).save(&path).unwrap();

    let tags = ExifTagReader::new()
        .read_tags(path.to_str().unwrap())
        .unwrap();
    assert!(tags.is_none());
}
