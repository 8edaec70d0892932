//! Scan command - score images for privacy and authenticity risks.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use photo_shield_adapters::FsImageSource;
use photo_shield_core::{
    ImageSource, ProgressEvent, ProgressSink, ResultOutput, ScanRecord, Scanner, Status,
};
use tracing::{debug, info, warn};

use super::{EngineArgs, ExitCode};
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Arguments for the scan command.
#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Files or directories to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,
}

impl ScanArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        if !self.recursive {
            self.recursive = config.general.recursive.unwrap_or(false);
        }
        self.engine = self.engine.with_config(config);

        if self.format.is_none() {
            self.format = config
                .output
                .format
                .as_deref()
                .and_then(|s| OutputFormat::from_str(s, true).ok());
        }
        if !self.pretty {
            self.pretty = config.output.pretty.unwrap_or(false);
        }
        if !self.progress {
            self.progress = config.output.progress.unwrap_or(false);
        }
        self
    }

    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

/// Counts from a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub scanned: usize,
    pub skipped: usize,
    pub high_risk: usize,
}

impl BatchSummary {
    /// HIGH RISK wins over skipped images; a clean run is success.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        if self.high_risk > 0 {
            ExitCode::HighRisk
        } else if self.skipped > 0 {
            ExitCode::Error
        } else {
            ExitCode::Success
        }
    }
}

/// Run the scan command.
///
/// Expects `args` to have been processed through `with_config()` first.
pub fn run(args: &ScanArgs, config: &AppConfig) -> Result<BatchSummary> {
    info!("Running scan command on {} paths", args.paths.len());

    let scanner = args.engine.build_scanner(config)?;
    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output = match args.format() {
        OutputFormat::Jsonl => JsonOutput::stdout(),
        OutputFormat::Json => JsonOutput::stdout().as_array(args.pretty),
    };

    scan_batch(&source, &scanner, &output, &progress)
}

/// Scans every image from `source`, writing one record per image.
///
/// Images that fail to load or scan are reported and skipped.
///
/// # Errors
///
/// Returns an error only if writing output fails.
pub fn scan_batch(
    source: &dyn ImageSource,
    scanner: &Scanner,
    output: &dyn ResultOutput,
    progress: &dyn ProgressSink,
) -> Result<BatchSummary> {
    let total = source.count_hint();
    let mut summary = BatchSummary {
        scanned: 0,
        skipped: 0,
        high_risk: 0,
    };

    for (index, image_result) in source.images().enumerate() {
        let image = match image_result {
            Ok(img) => img,
            Err(e) => {
                // The error context names the path.
                progress.on_event(ProgressEvent::Skipped {
                    path: format!("image {index}"),
                    reason: format!("{e:#}"),
                });
                summary.skipped += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            path: image.path.clone(),
            index,
            total,
        });

        let outcome = match scanner.scan(&image) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Scan failed for {}: {e:#}", image.path);
                progress.on_event(ProgressEvent::Skipped {
                    path: image.path.clone(),
                    reason: format!("{e:#}"),
                });
                summary.skipped += 1;
                continue;
            }
        };

        if outcome.report.status == Status::HighRisk {
            summary.high_risk += 1;
        }

        let record = ScanRecord {
            path: image.path.clone(),
            timestamp: iso_timestamp(),
            dimensions: image.dimensions(),
            report: outcome.report,
        };
        output.write(&record)?;
        progress.on_event(ProgressEvent::Completed {
            record: Box::new(record),
        });
        summary.scanned += 1;
    }

    output.flush()?;
    progress.on_event(ProgressEvent::Finished {
        scanned: summary.scanned,
        skipped: summary.skipped,
        high_risk: summary.high_risk,
    });
    debug!("Batch done: {summary:?}");

    Ok(summary)
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
