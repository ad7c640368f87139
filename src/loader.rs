use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::{Result, SyncError};
use crate::models::{Record, RecordType, KEY_COLUMN};

/// Discriminator column splitting projects from sub-tasks.
pub const TYPE_COLUMN: &str = "Issue Type";

#[derive(Debug)]
pub enum LoadResult {
    Loaded {
        primary: Vec<Record>,
        secondary: Vec<Record>,
    },
    /// The export file does not exist. Nothing to sync.
    NotFound(PathBuf),
    /// A required column is absent; carries the column name.
    SchemaError(String),
}

impl LoadResult {
    /// Collapse into `(projects, sub-tasks)`. A missing file yields two empty
    /// partitions; a schema violation is a hard error.
    pub fn into_partitions(self) -> Result<(Vec<Record>, Vec<Record>)> {
        match self {
            Self::Loaded { primary, secondary } => Ok((primary, secondary)),
            Self::NotFound(_) => Ok((Vec::new(), Vec::new())),
            Self::SchemaError(column) => Err(SyncError::MissingColumn(column)),
        }
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Read a semicolon-delimited export and split it into project and
/// sub-task records. Row order is kept within each partition.
///
/// Every row whose type matches is kept, including rows with an empty or
/// repeated key; the planner decides what to do with those.
pub fn load_and_filter(path: &Path) -> Result<LoadResult> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!("The file '{}' was not found.", path.display());
            return Ok(LoadResult::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let headers = rdr.headers()?.clone();

    let Some(idx_type) = column_index(&headers, TYPE_COLUMN) else {
        error!("CSV missing '{TYPE_COLUMN}' column.");
        return Ok(LoadResult::SchemaError(TYPE_COLUMN.to_string()));
    };
    let Some(idx_key) = column_index(&headers, KEY_COLUMN) else {
        error!("CSV missing '{KEY_COLUMN}' column.");
        return Ok(LoadResult::SchemaError(KEY_COLUMN.to_string()));
    };

    let mut primary = Vec::new();
    let mut secondary = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let Some(record_type) = row
            .get(idx_type)
            .and_then(|v| RecordType::from_discriminator(v.trim()))
        else {
            continue;
        };

        let key = row.get(idx_key).unwrap_or("").trim().to_string();
        let mut fields = HashMap::with_capacity(headers.len());
        for (header, value) in headers.iter().zip(row.iter()) {
            // Jira repeats some headers (Sprint, Labels); the first one wins.
            fields
                .entry(header.trim().to_string())
                .or_insert_with(|| value.to_string());
        }

        let record = Record {
            key,
            record_type,
            fields,
        };
        match record_type {
            RecordType::Project => primary.push(record),
            RecordType::Subtask => secondary.push(record),
        }
    }

    info!(
        "Loaded CSV. Found {} projects and {} subtasks.",
        primary.len(),
        secondary.len()
    );
    Ok(LoadResult::Loaded { primary, secondary })
}
