//! Mock implementations of core port traits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::anyhow;
use photo_shield_core::domain::{ImageInfo, ScanRecord, Status};
use photo_shield_core::ports::{
    BarcodeDecoder, BarcodeHit, FaceBox, FaceDetector, ImageSource, ProgressEvent, ProgressSink,
    ResultOutput, TagMap, TagReader, TextRecognizer, TextScan,
};

/// Face detector returning a fixed list of boxes.
///
/// Counts calls so tests can tell cached detections from re-runs.
pub struct MockFaceDetector {
    faces: Vec<FaceBox>,
    fingerprint: String,
    fail: bool,
    calls: AtomicUsize,
}

impl MockFaceDetector {
    #[must_use]
    pub fn new(faces: Vec<FaceBox>) -> Self {
        Self {
            faces,
            fingerprint: "mock-faces".into(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self::new(vec![])
    }

    /// A detector whose every call fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::none()
        }
    }

    /// A single face box with full confidence.
    #[must_use]
    pub const fn face(x: f32, y: f32, width: f32, height: f32) -> FaceBox {
        FaceBox {
            x,
            y,
            width,
            height,
            score: 1.0,
        }
    }

    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: &str) -> Self {
        self.fingerprint = fingerprint.to_string();
        self
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FaceDetector for MockFaceDetector {
    fn detect(&self, _image: &ImageInfo) -> anyhow::Result<Vec<FaceBox>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("mock face detector failure"));
        }
        Ok(self.faces.clone())
    }

    fn fingerprint(&self) -> String {
        self.fingerprint.clone()
    }
}

/// Barcode decoder returning fixed hits.
pub struct MockBarcodeDecoder {
    hits: Vec<BarcodeHit>,
}

impl MockBarcodeDecoder {
    #[must_use]
    pub const fn new(hits: Vec<BarcodeHit>) -> Self {
        Self { hits }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self::new(vec![])
    }

    /// A QR-style hit with the four corners of the given rectangle.
    #[must_use]
    pub fn square(x: f32, y: f32, width: f32, height: f32) -> BarcodeHit {
        BarcodeHit {
            points: vec![
                (x, y),
                (x + width, y),
                (x + width, y + height),
                (x, y + height),
            ],
            payload: "mock".into(),
        }
    }
}

impl BarcodeDecoder for MockBarcodeDecoder {
    fn decode(&self, _image: &ImageInfo) -> anyhow::Result<Vec<BarcodeHit>> {
        Ok(self.hits.clone())
    }
}

/// Text recognizer returning a fixed outcome.
pub struct MockTextRecognizer {
    scan: TextScan,
}

impl MockTextRecognizer {
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            scan: TextScan::Text(text.to_string()),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::text("")
    }

    #[must_use]
    pub fn unavailable(reason: &str) -> Self {
        Self {
            scan: TextScan::Unavailable {
                reason: reason.to_string(),
            },
        }
    }
}

impl TextRecognizer for MockTextRecognizer {
    fn recognize(&self, _image: &ImageInfo) -> TextScan {
        self.scan.clone()
    }
}

/// Tag reader returning the same map for every path.
pub struct MockTagReader {
    tags: Option<TagMap>,
    fail: bool,
}

impl MockTagReader {
    #[must_use]
    pub const fn new(tags: Option<TagMap>) -> Self {
        Self { tags, fail: false }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self::new(None)
    }

    #[must_use]
    pub const fn failing() -> Self {
        Self {
            tags: None,
            fail: true,
        }
    }
}

impl TagReader for MockTagReader {
    fn read_tags(&self, path: &str) -> anyhow::Result<Option<TagMap>> {
        if self.fail {
            return Err(anyhow!("mock tag reader failure for {path}"));
        }
        Ok(self.tags.clone())
    }
}

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images and tracks iteration for assertions.
pub struct MockImageSource {
    images: Vec<ImageInfo>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    #[must_use]
    pub fn new(images: Vec<ImageInfo>) -> Self {
        Self {
            images,
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_> {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Box::new(self.images.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.images.len())
    }
}

/// Captures scan records for later assertions.
pub struct MockResultOutput {
    records: Arc<Mutex<Vec<ScanRecord>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    #[must_use]
    pub fn records(&self) -> Vec<ScanRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, record: &ScanRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

/// Captures progress events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Statuses of completed scans, in event order.
    #[must_use]
    pub fn completed_statuses(&self) -> Vec<Status> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Completed { record } => Some(record.report.status),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// `(scanned, skipped, high_risk)` from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished {
                scanned,
                skipped,
                high_risk,
            } => Some((*scanned, *skipped, *high_risk)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn image() -> ImageInfo {
        ImageInfo::new("test.jpg", image::DynamicImage::new_rgb8(10, 10))
    }

    #[test]
    fn test_mock_face_detector_counts_calls() {
        let faces = MockFaceDetector::new(vec![MockFaceDetector::face(1.0, 1.0, 4.0, 4.0)]);
        assert_eq!(faces.detect(&image()).unwrap().len(), 1);
        assert_eq!(faces.detect(&image()).unwrap().len(), 1);
        assert_eq!(faces.calls(), 2);
        assert!(MockFaceDetector::failing().detect(&image()).is_err());
    }

    #[test]
    fn test_mock_image_source() {
        let source = MockImageSource::new(vec![image()]);
        assert_eq!(source.count_hint(), Some(1));
        assert_eq!(source.images().count(), 1);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_text_and_tags() {
        assert_eq!(
            MockTextRecognizer::unavailable("missing").recognize(&image()),
            TextScan::Unavailable {
                reason: "missing".into()
            }
        );
        assert!(MockTagReader::none().read_tags("x").unwrap().is_none());
        assert!(MockTagReader::failing().read_tags("x").is_err());
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();
        sink.on_event(ProgressEvent::Started {
            path: "test.jpg".into(),
            index: 0,
            total: Some(1),
        });
        sink.on_event(ProgressEvent::Finished {
            scanned: 1,
            skipped: 0,
            high_risk: 1,
        });

        assert_eq!(sink.started_count(), 1);
        assert_eq!(sink.finished_counts(), Some((1, 0, 1)));
    }
}
