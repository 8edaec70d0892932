//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;

fn shield() -> Command {
    Command::cargo_bin("photo-shield").unwrap()
}

/// Writes a plain gray PNG: no faces, no codes, no metadata.
fn gray_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(64, 64, Rgb([128, 128, 128]))
        .save(&path)
        .unwrap();
    path
}

// === Missing/Invalid Path Tests ===

#[test]
fn test_scan_requires_paths() {
    shield()
        .arg("scan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required").or(predicate::str::contains("PATHS")));
}

#[test]
fn test_subcommand_required() {
    shield().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_nonexistent_path_warns_but_continues() {
    shield()
        .args(["scan", "/nonexistent/path/to/image.jpg"])
        .args(["--no-faces", "--no-ocr"])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_empty_directory() {
    let temp_dir = tempfile::tempdir().unwrap();

    shield()
        .arg("scan")
        .arg(temp_dir.path())
        .args(["--no-faces", "--no-ocr"])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_corrupt_image_is_skipped_with_error_code() {
    let temp_dir = tempfile::tempdir().unwrap();
    let good = gray_png(temp_dir.path(), "good.png");
    let bad = temp_dir.path().join("bad.jpg");
    std::fs::write(&bad, b"not really a jpeg").unwrap();

    shield()
        .arg("scan")
        .args([&good, &bad])
        .args(["--no-faces", "--no-ocr", "--quiet"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("good.png"));
}

// === Format Validation Tests ===

#[test]
fn test_invalid_format_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = gray_png(temp_dir.path(), "a.png");

    shield()
        .args(["scan", "--format", "xml"])
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("json").or(predicate::str::contains("jsonl")));
}

// === Ratio Validation Tests ===

#[test]
fn test_face_size_ratio_above_one_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = gray_png(temp_dir.path(), "a.png");

    shield()
        .args(["scan", "--face-size-ratio", "2.0"])
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 is not in 0.0..=1.0"));
}

#[test]
fn test_face_size_ratio_non_numeric_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = gray_png(temp_dir.path(), "a.png");

    shield()
        .args(["scan", "--face-size-ratio", "abc"])
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid number"));
}

// === Protect Argument Tests ===

#[test]
fn test_protect_rejects_unknown_action() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = gray_png(temp_dir.path(), "a.png");

    shield()
        .args(["protect", "--action", "explode", "-o"])
        .arg(temp_dir.path().join("out.jpg"))
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown action"));
}

#[test]
fn test_protect_rejects_bad_indices() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = gray_png(temp_dir.path(), "a.png");
    let out = temp_dir.path().join("out.jpg");

    shield()
        .args(["protect", "--action", "blur-selected", "--indices", "0,x"])
        .args(["--no-faces", "--no-ocr", "-o"])
        .arg(&out)
        .arg(&image)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid index"));
    assert!(!out.exists());
}

// === Verbosity Level Tests ===

#[test]
fn test_verbosity_levels() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = gray_png(temp_dir.path(), "a.png");

    for flag in ["-v", "-vv", "-vvv"] {
        shield()
            .arg(flag)
            .arg("scan")
            .arg(&image)
            .args(["--no-faces", "--no-ocr", "--quiet"])
            .assert()
            .code(0);
    }
}

#[test]
fn test_info_logging_goes_to_stderr() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = gray_png(temp_dir.path(), "a.png");

    let output = shield()
        .args(["-v", "scan"])
        .arg(&image)
        .args(["--no-faces", "--no-ocr", "--quiet"])
        .output()
        .unwrap();

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Scanning"));
}

// === Models Command ===

#[test]
fn test_models_path_honors_override() {
    let temp_dir = tempfile::tempdir().unwrap();

    shield()
        .args(["models", "path", "--models-dir"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(temp_dir.path().to_str().unwrap()));
}

#[test]
fn test_models_list_reports_missing() {
    let temp_dir = tempfile::tempdir().unwrap();

    shield()
        .args(["models", "list", "--models-dir"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("blazeface"))
        .stdout(predicate::str::contains("0/1 models installed"));
}
