//! Protect command - write a redacted or cloaked copy of an image.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use photo_shield_adapters::{load_image, save_image};
use photo_shield_core::{parse_indices, ProtectAction, ProtectRequest, Session};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::{jpeg_quality, EngineArgs};
use crate::config::AppConfig;

/// Arguments for the protect command.
#[derive(Args, Clone)]
pub struct ProtectArgs {
    /// Image to protect
    pub path: PathBuf,

    /// `blur-selected` redacts the listed detections; `cloak` adds noise to every face
    #[arg(long, value_parser = parse_action)]
    pub action: ProtectAction,

    /// Comma-separated detection indices, as numbered by `scan` and `preview`
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub indices: String,

    /// Where to write the result; format follows the extension
    #[arg(short, long, value_name = "OUT")]
    pub output: PathBuf,

    /// Seed for cloaking noise, for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

fn parse_action(s: &str) -> Result<ProtectAction, String> {
    s.parse().map_err(|e: photo_shield_core::ShieldError| e.to_string())
}

impl ProtectArgs {
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.engine = self.engine.with_config(config);
        self
    }
}

/// Run the protect command.
pub fn run(args: &ProtectArgs, config: &AppConfig) -> Result<()> {
    let request = ProtectRequest {
        action: args.action,
        indices: parse_indices(&args.indices)?,
        token: None,
    };

    let scanner = args.engine.build_scanner(config)?;
    let mut session = Session::new();
    session.load(load_image(&args.path)?, None);

    let protected = match args.seed {
        Some(seed) => {
            session.protect_with_rng(&scanner, &request, &mut StdRng::seed_from_u64(seed))?
        }
        None => session.protect(&scanner, &request)?,
    };

    save_image(&protected, &args.output, jpeg_quality(config))?;
    info!(
        "Wrote {} ({:?}) to {}",
        args.path.display(),
        args.action,
        args.output.display()
    );
    Ok(())
}
