//! Serve command - run the HTTP API.

use anyhow::{Context, Result};
use clap::Args;

use super::{jpeg_quality, EngineArgs};
use crate::config::AppConfig;
use crate::server;

/// Address used when neither `--bind` nor config set one.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Arguments for the serve command.
#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Address to listen on (e.g. 0.0.0.0:8000)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl ServeArgs {
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        if self.bind.is_none() {
            self.bind.clone_from(&config.server.bind);
        }
        self.engine = self.engine.with_config(config);
        self
    }

    fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }
}

/// Run the serve command. Blocks until the server stops.
pub fn run(args: &ServeArgs, config: &AppConfig) -> Result<()> {
    let scanner = args.engine.build_scanner(config)?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::start(scanner, jpeg_quality(config), args.bind()))
}
