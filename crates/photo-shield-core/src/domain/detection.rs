//! Detections and the stable detection index.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ImageInfo;

/// Axis-aligned pixel rectangle, origin top-left.
///
/// Serialized as `[x, y, width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct BoundingBox {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BoundingBox {
    /// Creates a new box.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Returns true if the pixel `(px, py)` lies inside the box.
    #[must_use]
    pub const fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Intersects the box with an image of the given size.
    ///
    /// Returns `None` when nothing of the box is left.
    #[must_use]
    pub fn clip(&self, width: u32, height: u32) -> Option<Self> {
        let x1 = self.x.min(width);
        let y1 = self.y.min(height);
        let x2 = self.right().min(width);
        let y2 = self.bottom().min(height);

        (x2 > x1 && y2 > y1).then(|| Self::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Smallest box covering a set of points, clipped to the image.
    ///
    /// A flat extent (all points on one row or column) is widened to one pixel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn enclosing(points: &[(f32, f32)], width: u32, height: u32) -> Option<Self> {
        let finite = points.iter().filter(|(x, y)| x.is_finite() && y.is_finite());
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        let mut any = false;
        for &(x, y) in finite {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if !any {
            return None;
        }

        // Negative coordinates saturate to zero in the casts.
        let x1 = min_x.floor().max(0.0) as u32;
        let y1 = min_y.floor().max(0.0) as u32;
        let x2 = (max_x.ceil().max(0.0) as u32).max(x1 + 1);
        let y2 = (max_y.ceil().max(0.0) as u32).max(y1 + 1);

        Self::new(x1, y1, x2 - x1, y2 - y1).clip(width, height)
    }
}

impl From<[u32; 4]> for BoundingBox {
    fn from([x, y, width, height]: [u32; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<BoundingBox> for [u32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

/// What a detection found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionKind {
    /// A frontal face.
    Face,
    /// A barcode or QR code.
    Barcode,
}

impl fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Face => "FACE",
            Self::Barcode => "BARCODE",
        })
    }
}

/// A typed region found in an image. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Detection type.
    #[serde(rename = "type")]
    pub kind: DetectionKind,
    /// Region in pixel coordinates.
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl Detection {
    /// A face detection.
    #[must_use]
    pub const fn face(bbox: BoundingBox) -> Self {
        Self {
            kind: DetectionKind::Face,
            bbox,
        }
    }

    /// A barcode detection.
    #[must_use]
    pub const fn barcode(bbox: BoundingBox) -> Self {
        Self {
            kind: DetectionKind::Barcode,
            bbox,
        }
    }
}

/// Output of one detection run over an image.
///
/// The stable index of a detection is its position in [`DetectionSet::all`]:
/// faces in detector emission order, then barcodes in decoder emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionSet {
    /// Face detections.
    pub faces: Vec<Detection>,
    /// Barcode detections.
    pub barcodes: Vec<Detection>,
    /// True if any face is tall enough to count as a close-up.
    pub close_up_risk: bool,
}

impl DetectionSet {
    /// Iterates all detections in stable-index order.
    pub fn all(&self) -> impl Iterator<Item = &Detection> + '_ {
        self.faces.iter().chain(self.barcodes.iter())
    }

    /// Collects all detections in stable-index order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Detection> {
        self.all().copied().collect()
    }

    /// Total number of detections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len() + self.barcodes.len()
    }

    /// Returns true if nothing was detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves a stable index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Detection> {
        self.faces
            .get(index)
            .or_else(|| self.barcodes.get(index.checked_sub(self.faces.len())?))
    }

    /// Resolves a list of requested indices, keeping request order.
    ///
    /// Negative and out-of-range indices are dropped without error.
    #[must_use]
    pub fn select(&self, indices: &[i64]) -> Vec<Detection> {
        indices
            .iter()
            .filter_map(|&i| usize::try_from(i).ok())
            .filter_map(|i| self.get(i).copied())
            .collect()
    }
}

/// Opaque identifier binding a detection set to the exact pixels and
/// detector configuration it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionToken(String);

impl DetectionToken {
    /// Hashes the image pixels together with a detector fingerprint.
    #[must_use]
    pub fn compute(image: &ImageInfo, fingerprint: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(image.width.to_le_bytes());
        hasher.update(image.height.to_le_bytes());
        hasher.update(image.pixels.as_raw());
        hasher.update(fingerprint.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Wraps a token string received from a client.
    #[must_use]
    pub fn from_client(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DetectionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
