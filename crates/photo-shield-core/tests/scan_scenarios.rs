//! End-to-end scans against mocked collaborators.

#![allow(clippy::unwrap_used)]

use photo_shield_core::domain::{DetectionKind, OcrStatus, PiiFinding, Status};
use photo_shield_core::ports::{keys, TagMap, TagValue};
use photo_shield_core::{ScanConfig, Scanner};
use photo_shield_test_support::{
    MockBarcodeDecoder, MockFaceDetector, MockPorts, MockTagReader, MockTextRecognizer,
    SyntheticImageBuilder,
};

fn gps_tags() -> TagMap {
    TagMap::from([
        (keys::GPS_INFO.to_string(), TagValue::Numbers(vec![])),
        (keys::MAKE.to_string(), TagValue::Text("Canon".into())),
    ])
}

fn scanner(ports: &MockPorts) -> Scanner {
    Scanner::new(ScanConfig::default(), ports.collaborators()).unwrap()
}

#[test]
fn test_clean_image_is_safe() {
    let ports = MockPorts::clean();
    let outcome = scanner(&ports)
        .scan(&SyntheticImageBuilder::clean_image())
        .unwrap();
    let report = outcome.report;

    assert_eq!(report.score, 100);
    assert_eq!(report.status, Status::Safe);
    assert!(report.threats.is_empty());
    assert!(report.detections.is_empty());
    assert_eq!(report.meta.device_info, "Unknown");
    assert_eq!(report.ocr, OcrStatus::Ok);
}

#[test]
fn test_close_up_face_with_gps_is_critical() {
    // 128px tall image, 32px face: 25% of the height.
    let ports = MockPorts::clean()
        .with_faces(vec![MockFaceDetector::face(40.0, 40.0, 32.0, 32.0)])
        .with_tags(gps_tags());
    let report = scanner(&ports)
        .scan(&SyntheticImageBuilder::clean_image())
        .unwrap()
        .report;

    assert_eq!(report.score, 0);
    assert_eq!(report.status, Status::HighRisk);
    let messages: Vec<String> = report.threats.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        vec![
            "GPS Location Data Embedded",
            "Potential Child Detected (Sharenting Risk)",
            "CRITICAL: Child Face + GPS Location combined!",
        ]
    );
    assert!(report.meta.gps_found);
    assert_eq!(report.meta.device_info, "Canon");
}

#[test]
fn test_small_face_is_not_close_up() {
    let ports = MockPorts::clean()
        .with_faces(vec![MockFaceDetector::face(10.0, 10.0, 20.0, 20.0)])
        .with_tags(gps_tags());
    let report = scanner(&ports)
        .scan(&SyntheticImageBuilder::clean_image())
        .unwrap()
        .report;

    assert_eq!(report.score, 75);
    assert_eq!(report.detections.len(), 1);
    assert_eq!(report.detections[0].kind, DetectionKind::Face);
}

#[test]
fn test_detections_are_faces_then_barcodes() {
    let ports = MockPorts::clean()
        .with_faces(vec![
            MockFaceDetector::face(70.0, 70.0, 10.0, 10.0),
            MockFaceDetector::face(5.0, 5.0, 10.0, 10.0),
        ])
        .with_barcodes(vec![MockBarcodeDecoder::square(20.0, 80.0, 30.0, 30.0)]);
    let report = scanner(&ports)
        .scan(&SyntheticImageBuilder::clean_image())
        .unwrap()
        .report;

    let kinds: Vec<DetectionKind> = report.detections.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![DetectionKind::Face, DetectionKind::Face, DetectionKind::Barcode]
    );
    // Emission order, not position order.
    assert_eq!(report.detections[0].bbox.x, 70);
    assert_eq!(report.score, 90);
    assert_eq!(report.threats[0].to_string(), "Found 1 Barcodes/QR Codes");
}

#[test]
fn test_pii_threat_lists_findings() {
    let ports = MockPorts::clean().with_text(MockTextRecognizer::text(
        "Reach me at kid.parent@example.com or 555-867-5309",
    ));
    let report = scanner(&ports)
        .scan(&SyntheticImageBuilder::clean_image())
        .unwrap()
        .report;

    assert_eq!(report.score, 85);
    assert!(report.pii.contains(PiiFinding::EmailFound));
    assert!(report.pii.contains(PiiFinding::PhoneFound));
    assert_eq!(
        report.threats[0].to_string(),
        "Personal Text Found: EMAIL_FOUND, PHONE_FOUND"
    );
}

#[test]
fn test_ocr_unavailable_is_reported_not_fatal() {
    let ports = MockPorts::clean().with_text(MockTextRecognizer::unavailable("not installed"));
    let report = scanner(&ports)
        .scan(&SyntheticImageBuilder::clean_image())
        .unwrap()
        .report;

    assert_eq!(report.score, 100);
    assert_eq!(report.ocr, OcrStatus::Unavailable);
    assert!(report.pii.is_empty());
}

#[test]
fn test_detector_failure_fails_scan() {
    let ports = MockPorts::clean().with_face_detector(MockFaceDetector::failing());
    let result = scanner(&ports).scan(&SyntheticImageBuilder::clean_image());
    assert!(result.is_err());
}

#[test]
fn test_tag_reader_failure_fails_scan() {
    let ports = MockPorts::clean().with_tag_reader(MockTagReader::failing());
    let err = scanner(&ports)
        .scan(&SyntheticImageBuilder::clean_image())
        .unwrap_err();
    assert!(format!("{err:#}").contains("metadata"));
}

#[test]
fn test_scan_is_deterministic() {
    let ports = MockPorts::clean()
        .with_faces(vec![MockFaceDetector::face(3.0, 4.0, 30.0, 40.0)])
        .with_barcodes(vec![MockBarcodeDecoder::square(60.0, 60.0, 20.0, 20.0)]);
    let scanner = scanner(&ports);
    let image = SyntheticImageBuilder::gradient(128, 96);

    let a = scanner.scan(&image).unwrap();
    let b = scanner.scan(&image).unwrap();
    assert_eq!(a.report.detections, b.report.detections);
    assert_eq!(a.report.detection_token, b.report.detection_token);
    assert_eq!(a.report.threats, b.report.threats);
}

#[test]
fn test_report_serializes_wire_shape() {
    let ports = MockPorts::clean()
        .with_faces(vec![MockFaceDetector::face(10.0, 20.0, 30.0, 40.0)]);
    let report = scanner(&ports)
        .scan(&SyntheticImageBuilder::clean_image())
        .unwrap()
        .report;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["score"], 80);
    assert_eq!(json["status"], "SAFE");
    assert_eq!(json["detections"][0]["type"], "FACE");
    assert_eq!(json["detections"][0]["box"], serde_json::json!([10, 20, 30, 40]));
    assert_eq!(json["threats"][0], "Potential Child Detected (Sharenting Risk)");
    assert_eq!(json["ocr"], "ok");
    assert!(json["detection_token"].as_str().unwrap().len() == 64);
}
