//! Models command - manage ML models.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use photo_shield_adapters::models::{model_info, MODELS};
use photo_shield_adapters::ModelStore;

use crate::config::AppConfig;

/// Arguments for the models command
#[derive(Args, Clone)]
pub struct ModelsArgs {
    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR", global = true)]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Models subcommands
#[derive(Subcommand, Clone)]
pub enum ModelsCommand {
    /// Download required models
    Fetch {
        /// Download again even if present
        #[arg(long)]
        force: bool,
    },
    /// List installed models
    List,
    /// Print model directory path
    Path,
}

/// Run the models command.
pub fn run(args: &ModelsArgs, config: &AppConfig) -> Result<()> {
    let store = args
        .models_dir
        .clone()
        .or_else(|| config.models.dir.clone())
        .map_or_else(ModelStore::default, ModelStore::new);

    match args.command {
        ModelsCommand::Fetch { force } => fetch_models(&store, force),
        ModelsCommand::List => {
            list_models(&store);
            Ok(())
        }
        ModelsCommand::Path => {
            println!("{}", store.dir().display());
            Ok(())
        }
    }
}

fn fetch_models(store: &ModelStore, force: bool) -> Result<()> {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {msg}")
        .map_err(|e| anyhow::anyhow!("Invalid progress template: {e}"))?
        .progress_chars("#>-");

    for model in MODELS {
        let pb = ProgressBar::new(0);
        pb.set_style(style.clone());
        pb.set_message(model.name);

        let path = store.ensure(model.name, force, &mut |downloaded, total| {
            if let Some(t) = total {
                pb.set_length(t);
            }
            pb.set_position(downloaded);
        })?;
        pb.finish_and_clear();
        println!("{} -> {}", model.name, path.display());
    }
    Ok(())
}

fn list_models(store: &ModelStore) {
    let models = store.list();

    println!("Models directory: {}", store.dir().display());
    println!();

    for (name, installed) in &models {
        let status = if *installed { "✓" } else { "✗" };
        let filename = model_info(name).map_or("unknown", |m| m.filename);
        println!("  {status} {name} ({filename})");
    }

    println!();
    let installed_count = models.iter().filter(|(_, installed)| *installed).count();
    println!("{}/{} models installed", installed_count, models.len());
}
