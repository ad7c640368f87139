pub mod check;
pub mod init;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "boardsync",
    version,
    about = "Reconcile a Jira CSV export against monday.com boards."
)]
pub struct Cli {
    /// Settings file (default: ~/.config/boardsync/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a settings template with example board mappings.
    Init {
        /// CSV export to sync by default
        #[arg(long)]
        csv: Option<String>,
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// Show the resolved configuration.
    Status,
    /// Load a CSV export and report how it partitions, without contacting the boards.
    Check {
        /// Path to the CSV export (default: csv_path from settings)
        csv: Option<String>,
    },
    /// Create and update board items so they match the CSV export.
    Sync {
        /// Path to the CSV export (default: csv_path from settings)
        csv: Option<String>,
        /// Fetch and plan, but do not write anything
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
}
