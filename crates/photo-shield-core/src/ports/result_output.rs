//! Result output port for writing scan records.

use crate::domain::ScanRecord;

/// Port for writing scan records.
pub trait ResultOutput: Send + Sync {
    /// Writes a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, record: &ScanRecord) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
