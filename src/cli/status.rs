use std::path::Path;

use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::models::RecordType;
use crate::settings::{mask_secret, Settings};

fn board_id_or_unset(id: u64) -> String {
    if id == 0 {
        "(not set)".to_string()
    } else {
        id.to_string()
    }
}

pub fn run(settings_path: &Path, settings: &Settings) -> Result<()> {
    let file_note = if settings_path.exists() { "" } else { " (missing, using defaults)" };
    println!("Settings:   {}{file_note}", settings_path.display());
    println!("Endpoint:   {} (API {})", settings.api_endpoint, settings.api_version);
    println!("Token:      {}", mask_secret(&settings.api_token));
    println!("CSV:        {}", settings.csv_path);
    println!(
        "Paging:     {} items/page, at most {} pages, {}s timeout",
        settings.page_size, settings.max_pages, settings.request_timeout_secs
    );

    for record_type in [RecordType::Project, RecordType::Subtask] {
        println!();
        println!(
            "{record_type} board: {}",
            board_id_or_unset(settings.board_id(record_type))
        );
        let config = settings.mapping_config(record_type);
        if config.is_empty() {
            println!("  (no columns mapped)");
            continue;
        }
        let mut table = Table::new();
        table.set_header(vec!["CSV column", "Board column"]);
        for (source, column_id) in config {
            table.add_row(vec![Cell::new(source), Cell::new(column_id)]);
        }
        println!("{table}");
        if let Err(e) = settings.board_mapping(record_type) {
            println!("  warning: {e}");
        }
    }
    Ok(())
}
