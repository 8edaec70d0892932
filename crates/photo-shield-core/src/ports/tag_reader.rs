//! Embedded metadata port.

use std::collections::BTreeMap;

/// Tag names the core looks up.
pub mod keys {
    /// Present when the file carries a GPS IFD.
    pub const GPS_INFO: &str = "GPSInfo";
    pub const MAKE: &str = "Make";
    pub const MODEL: &str = "Model";
    pub const GPS_LATITUDE: &str = "GPSLatitude";
    pub const GPS_LATITUDE_REF: &str = "GPSLatitudeRef";
    pub const GPS_LONGITUDE: &str = "GPSLongitude";
    pub const GPS_LONGITUDE_REF: &str = "GPSLongitudeRef";
}

/// A decoded tag value.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Text(String),
    /// Integer and rational values, rationals already divided out.
    Numbers(Vec<f64>),
}

impl TagValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Numbers(_) => None,
        }
    }

    #[must_use]
    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            Self::Numbers(n) => Some(n),
            Self::Text(_) => None,
        }
    }
}

/// Tags keyed by their standard EXIF name.
pub type TagMap = BTreeMap<String, TagValue>;

/// Port for reading the tag dictionary embedded in an image file.
pub trait TagReader: Send + Sync {
    /// Reads tags from the file at `path`.
    ///
    /// Returns `Ok(None)` if the file has no tag block.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the block is corrupt.
    fn read_tags(&self, path: &str) -> anyhow::Result<Option<TagMap>>;
}
