//! Preview command - annotate detections with their indices.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use photo_shield_adapters::{load_image, save_image};
use photo_shield_core::Session;
use tracing::info;

use super::{jpeg_quality, EngineArgs};
use crate::config::AppConfig;

/// Arguments for the preview command.
#[derive(Args, Clone)]
pub struct PreviewArgs {
    /// Image to annotate
    pub path: PathBuf,

    /// Where to write the annotated copy
    #[arg(short, long, value_name = "OUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl PreviewArgs {
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.engine = self.engine.with_config(config);
        self
    }
}

/// Run the preview command.
pub fn run(args: &PreviewArgs, config: &AppConfig) -> Result<()> {
    let scanner = args.engine.build_scanner(config)?;
    let mut session = Session::new();
    session.load(load_image(&args.path)?, None);

    let annotated = session.preview(&scanner)?;
    save_image(&annotated, &args.output, jpeg_quality(config))?;
    info!("Wrote preview to {}", args.output.display());
    Ok(())
}
