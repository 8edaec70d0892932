//! Image source port for batch scanning.

use crate::domain::ImageInfo;

/// Port for enumerating and decoding images to scan.
pub trait ImageSource: Send + Sync {
    /// Returns an iterator over decoded images.
    ///
    /// # Errors
    ///
    /// Individual items are errors when a file fails to decode. The item
    /// error should name the path.
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_>;

    /// Returns the total number of images, if known up front.
    fn count_hint(&self) -> Option<usize>;
}
