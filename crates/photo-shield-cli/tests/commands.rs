//! End-to-end tests for scan, protect and preview.
//!
//! Face detection and OCR are disabled so results do not depend on
//! downloaded models or an installed OCR engine.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use serde_json::Value;

fn shield() -> Command {
    Command::cargo_bin("photo-shield").unwrap()
}

fn write_png(dir: &Path, name: &str, value: u8) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(48, 32, Rgb([value, value, value]))
        .save(&path)
        .unwrap();
    path
}

fn scan_json(args: &[&str], paths: &[&Path]) -> (Option<i32>, String) {
    let output = shield()
        .arg("scan")
        .args(["--no-faces", "--no-ocr", "--quiet"])
        .args(args)
        .args(paths)
        .output()
        .unwrap();
    (
        output.status.code(),
        String::from_utf8(output.stdout).unwrap(),
    )
}

// === Scan Output ===

#[test]
fn test_jsonl_record_shape() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = write_png(temp_dir.path(), "gray.png", 128);

    let (code, stdout) = scan_json(&[], &[&image]);
    assert_eq!(code, Some(0));

    let record: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(record["path"], image.display().to_string());
    assert!(record["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(record["dimensions"]["width"], 48);
    assert_eq!(record["dimensions"]["height"], 32);
    assert_eq!(record["score"], 100);
    assert_eq!(record["status"], "SAFE");
    assert_eq!(record["threats"], serde_json::json!([]));
    assert_eq!(record["detections"], serde_json::json!([]));
    assert_eq!(record["meta"]["device_info"], "Unknown");
    assert_eq!(record["forensics"]["compression_anomaly"], false);
    assert_eq!(record["ocr"], "unavailable");
    assert_eq!(record["detection_token"].as_str().unwrap().len(), 64);
}

#[test]
fn test_jsonl_one_object_per_image_in_directory_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_png(temp_dir.path(), "b.png", 100);
    write_png(temp_dir.path(), "a.png", 150);

    let (code, stdout) = scan_json(&[], &[temp_dir.path()]);
    assert_eq!(code, Some(0));

    let paths: Vec<String> = stdout
        .lines()
        .map(|line| {
            let v: Value = serde_json::from_str(line).unwrap();
            v["path"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(paths.len(), 2);
    assert!(paths[0].ends_with("a.png"));
    assert!(paths[1].ends_with("b.png"));
}

#[test]
fn test_json_array_format() {
    let temp_dir = tempfile::tempdir().unwrap();
    let a = write_png(temp_dir.path(), "a.png", 100);
    let b = write_png(temp_dir.path(), "b.png", 150);

    let (code, stdout) = scan_json(&["--format", "json", "--pretty"], &[&a, &b]);
    assert_eq!(code, Some(0));

    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
    assert!(stdout.contains("\n  "), "pretty output is indented");
}

#[test]
fn test_same_image_same_token() {
    let temp_dir = tempfile::tempdir().unwrap();
    let a = write_png(temp_dir.path(), "a.png", 90);
    let copy = temp_dir.path().join("copy.png");
    std::fs::copy(&a, &copy).unwrap();

    let (_, stdout) = scan_json(&[], &[&a, &copy]);
    let tokens: Vec<String> = stdout
        .lines()
        .map(|line| {
            let v: Value = serde_json::from_str(line).unwrap();
            v["detection_token"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0], tokens[1]);
}

// === Protect ===

#[test]
fn test_protect_without_detections_copies_pixels() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = write_png(temp_dir.path(), "in.png", 128);
    let out = temp_dir.path().join("out.png");

    shield()
        .args(["protect", "--action", "blur_selected", "--indices", "0,1"])
        .args(["--no-faces", "--no-ocr", "-o"])
        .arg(&out)
        .arg(&image)
        .assert()
        .success();

    let written = image::open(&out).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), (48, 32));
    assert!(written.pixels().all(|p| p.0 == [128, 128, 128]));
}

#[test]
fn test_protect_cloak_writes_jpeg() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = write_png(temp_dir.path(), "in.png", 128);
    let out = temp_dir.path().join("out.jpg");

    shield()
        .args(["protect", "--action", "cloak", "--seed", "7"])
        .args(["--no-faces", "--no-ocr", "-o"])
        .arg(&out)
        .arg(&image)
        .assert()
        .success();

    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_protect_missing_input_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    shield()
        .args(["protect", "--action", "cloak"])
        .args(["--no-faces", "--no-ocr", "-o"])
        .arg(temp_dir.path().join("out.jpg"))
        .arg(temp_dir.path().join("missing.png"))
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("error:"));
}

// === Preview ===

#[test]
fn test_preview_writes_annotated_copy() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = write_png(temp_dir.path(), "in.png", 200);
    let out = temp_dir.path().join("preview.png");

    shield()
        .args(["preview", "--no-faces", "--no-ocr", "-o"])
        .arg(&out)
        .arg(&image)
        .assert()
        .success();

    let written = image::open(&out).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), (48, 32));
    let original = image::open(&image).unwrap().to_rgb8();
    assert!(original.pixels().all(|p| p.0 == [200, 200, 200]));
}
