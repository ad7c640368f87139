use std::path::Path;

use crate::error::{Result, SyncError};
use crate::settings::{save_settings, Settings};

pub fn run(settings_path: &Path, csv: Option<&str>, force: bool) -> Result<()> {
    if settings_path.exists() && !force {
        return Err(SyncError::Settings(format!(
            "{} already exists. Pass --force to overwrite it.",
            settings_path.display()
        )));
    }

    save_settings(settings_path, &Settings::template(csv))?;

    println!("Wrote settings to {}", settings_path.display());
    println!("Fill in the board ids and column ids, and set MONDAY_API_TOKEN in the environment or .env.");
    Ok(())
}
