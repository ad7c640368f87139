mod board;
mod cli;
mod error;
mod executor;
mod fetcher;
mod loader;
mod logging;
mod models;
mod monday;
mod normalize;
mod planner;
mod settings;
mod sync;

use std::path::PathBuf;

use clap::Parser;

use cli::{Cli, Commands};
use error::Result;
use settings::{default_settings_path, resolve_settings};

fn csv_or_default(csv: Option<String>, default: &str) -> PathBuf {
    PathBuf::from(csv.unwrap_or_else(|| default.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let settings_path = cli.config.unwrap_or_else(default_settings_path);

    if let Commands::Init { csv, force } = &cli.command {
        return cli::init::run(&settings_path, csv.as_deref(), *force);
    }

    let settings = resolve_settings(&settings_path)?;
    logging::init(&settings.log_level);

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Status => cli::status::run(&settings_path, &settings),
        Commands::Check { csv } => cli::check::run(&csv_or_default(csv, &settings.csv_path)),
        Commands::Sync { csv, dry_run } => {
            cli::sync::run(&settings, &csv_or_default(csv, &settings.csv_path), dry_run)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
