//! Analyzers feeding the risk engine.
//!
//! Each analyzer is independent of the others; the pipeline runs them
//! concurrently and fans their reports into [`RiskEngine`].

mod content;
mod forensics;
mod histogram;
mod metadata;
mod risk;

pub use content::{find_pii, ContentConfig, ContentDetector};
pub use forensics::{ForensicsAnalyzer, ForensicsConfig};
pub use histogram::Histogram;
pub use metadata::{report_from_tags, MetadataRisk};
pub use risk::{RiskEngine, RiskSignals, RiskWeights};
