//! Photo Shield CLI - privacy and authenticity risk scanner for photographs.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;
mod server;

use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn report<T>(result: anyhow::Result<T>, on_ok: impl FnOnce(T) -> ExitCode) -> ExitCode {
    match result {
        Ok(value) => on_ok(value),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let exit_code = match cli.command {
        Commands::Scan(args) => {
            let args = args.with_config(&config);
            report(commands::scan::run(&args, &config), |summary| {
                summary.exit_code()
            })
        }
        Commands::Protect(args) => {
            let args = args.with_config(&config);
            report(commands::protect::run(&args, &config), |()| ExitCode::Success)
        }
        Commands::Preview(args) => {
            let args = args.with_config(&config);
            report(commands::preview::run(&args, &config), |()| ExitCode::Success)
        }
        Commands::Serve(args) => {
            let args = args.with_config(&config);
            report(commands::serve::run(&args, &config), |()| ExitCode::Success)
        }
        Commands::Models(args) => {
            report(commands::models::run(&args, &config), |()| ExitCode::Success)
        }
    };

    exit_code.into()
}
