use std::path::Path;

use comfy_table::{Cell, Table};

use crate::error::{Result, SyncError};
use crate::loader::{load_and_filter, LoadResult};
use crate::models::Record;

/// First and last non-empty keys; rows without a key are ignored here.
fn key_range(records: &[Record]) -> String {
    let mut keys = records.iter().map(|r| r.key.as_str()).filter(|k| !k.is_empty());
    match (keys.next(), keys.last()) {
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        (Some(only), None) => only.to_string(),
        _ => String::new(),
    }
}

pub fn run(csv_path: &Path) -> Result<()> {
    match load_and_filter(csv_path)? {
        LoadResult::NotFound(path) => {
            println!("{} not found. Nothing to sync.", path.display());
            Ok(())
        }
        LoadResult::SchemaError(column) => Err(SyncError::MissingColumn(column)),
        LoadResult::Loaded { primary, secondary } => {
            let mut table = Table::new();
            table.set_header(vec!["Type", "Records", "Keys"]);
            table.add_row(vec![
                Cell::new("Projects"),
                Cell::new(primary.len()),
                Cell::new(key_range(&primary)),
            ]);
            table.add_row(vec![
                Cell::new("Sub-tasks"),
                Cell::new(secondary.len()),
                Cell::new(key_range(&secondary)),
            ]);
            println!("{}\n{table}", csv_path.display());
            Ok(())
        }
    }
}
