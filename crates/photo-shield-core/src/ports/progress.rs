//! Progress reporting port for batch scans.

use crate::domain::ScanRecord;

/// Events emitted while a batch is scanned.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Scan started for an image.
    Started {
        path: String,
        /// Position in the batch (0-based).
        index: usize,
        total: Option<usize>,
    },
    /// Scan finished for an image.
    Completed { record: Box<ScanRecord> },
    /// An image could not be scanned.
    Skipped { path: String, reason: String },
    /// The batch is done.
    Finished {
        scanned: usize,
        skipped: usize,
        /// Images whose status was HIGH RISK.
        high_risk: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}
