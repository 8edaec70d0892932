//! Test support utilities for photo-shield.
//!
//! Provides port mocks, synthetic image builders and EXIF-bearing JPEG
//! files for testing the scan pipeline without models or external tools.
//!
//! # Example
//!
//! ```
//! use photo_shield_test_support::{MockPorts, SyntheticImageBuilder};
//! use photo_shield_core::{ScanConfig, Scanner};
//!
//! let scanner = Scanner::new(ScanConfig::default(), MockPorts::clean().collaborators()).unwrap();
//! let outcome = scanner.scan(&SyntheticImageBuilder::clean_image()).unwrap();
//! assert_eq!(outcome.report.score, 100);
//! ```

mod builders;
mod exif_jpeg;
mod mocks;

use std::sync::Arc;

use photo_shield_core::ports::{BarcodeHit, FaceBox, TagMap};
use photo_shield_core::Collaborators;

pub use builders::SyntheticImageBuilder;
pub use exif_jpeg::{Dms, ExifJpegBuilder};
pub use mocks::{
    MockBarcodeDecoder, MockFaceDetector, MockImageSource, MockProgressSink, MockResultOutput,
    MockTagReader, MockTextRecognizer,
};

/// A full set of mock collaborators, kept around for call-count assertions.
pub struct MockPorts {
    pub faces: Arc<MockFaceDetector>,
    pub barcodes: Arc<MockBarcodeDecoder>,
    pub text: Arc<MockTextRecognizer>,
    pub tags: Arc<MockTagReader>,
}

impl MockPorts {
    /// No faces, no barcodes, no text, no tags.
    #[must_use]
    pub fn clean() -> Self {
        Self {
            faces: Arc::new(MockFaceDetector::none()),
            barcodes: Arc::new(MockBarcodeDecoder::none()),
            text: Arc::new(MockTextRecognizer::empty()),
            tags: Arc::new(MockTagReader::none()),
        }
    }

    #[must_use]
    pub fn with_faces(mut self, faces: Vec<FaceBox>) -> Self {
        self.faces = Arc::new(MockFaceDetector::new(faces));
        self
    }

    #[must_use]
    pub fn with_face_detector(mut self, faces: MockFaceDetector) -> Self {
        self.faces = Arc::new(faces);
        self
    }

    #[must_use]
    pub fn with_barcodes(mut self, hits: Vec<BarcodeHit>) -> Self {
        self.barcodes = Arc::new(MockBarcodeDecoder::new(hits));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: MockTextRecognizer) -> Self {
        self.text = Arc::new(text);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: TagMap) -> Self {
        self.tags = Arc::new(MockTagReader::new(Some(tags)));
        self
    }

    #[must_use]
    pub fn with_tag_reader(mut self, tags: MockTagReader) -> Self {
        self.tags = Arc::new(tags);
        self
    }

    /// Port handles for a [`photo_shield_core::Scanner`].
    #[must_use]
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            faces: self.faces.clone(),
            barcodes: self.barcodes.clone(),
            text: self.text.clone(),
            tags: self.tags.clone(),
        }
    }
}
