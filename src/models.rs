use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Business key column, present in every export and every board mapping.
pub const KEY_COLUMN: &str = "Key";
/// Column whose value becomes the item name on create.
pub const NAME_COLUMN: &str = "Summary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Project,
    Subtask,
}

impl RecordType {
    /// Literal value of the discriminator column for this record type.
    pub fn discriminator(&self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Subtask => "Sub-task",
        }
    }

    pub fn from_discriminator(value: &str) -> Option<Self> {
        match value {
            "Project" => Some(Self::Project),
            "Sub-task" => Some(Self::Subtask),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Subtask => write!(f, "sub-task"),
        }
    }
}

/// One CSV row. Empty cells are kept as empty strings; columns the
/// export does not have are absent from `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: String,
    pub record_type: RecordType,
    pub fields: HashMap<String, String>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn name(&self) -> &str {
        self.get(NAME_COLUMN).map(str::trim).unwrap_or("")
    }
}

/// How a remote column wants its values, decided from the column id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Label,
    MultiLabel,
    Text,
}

impl ColumnKind {
    pub fn from_column_id(column_id: &str) -> Self {
        if column_id.starts_with("date_") {
            Self::Date
        } else if column_id.starts_with("color_") {
            Self::Label
        } else if column_id.starts_with("dropdown_") {
            Self::MultiLabel
        } else {
            Self::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedColumn {
    pub source: String,
    pub column_id: String,
    pub kind: ColumnKind,
}

/// Typed form of a configured source-column -> remote-column mapping.
#[derive(Debug, Clone)]
pub struct BoardMapping {
    pub record_type: RecordType,
    pub key_column_id: String,
    pub columns: Vec<MappedColumn>,
}

impl BoardMapping {
    pub fn from_config(record_type: RecordType, config: &BTreeMap<String, String>) -> Result<Self> {
        let key_column_id = config
            .get(KEY_COLUMN)
            .filter(|id| !id.trim().is_empty())
            .cloned()
            .ok_or(SyncError::MissingKeyMapping(record_type))?;

        let columns = config
            .iter()
            .map(|(source, column_id)| MappedColumn {
                source: source.clone(),
                column_id: column_id.clone(),
                kind: ColumnKind::from_column_id(column_id),
            })
            .collect();

        Ok(Self {
            record_type,
            key_column_id,
            columns,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnValue {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub column_values: Vec<ColumnValue>,
}

impl RemoteItem {
    pub fn text_of(&self, column_id: &str) -> Option<&str> {
        self.column_values
            .iter()
            .find(|cv| cv.id == column_id)
            .and_then(|cv| cv.text.as_deref())
    }

    pub fn column_texts(&self) -> HashMap<&str, &str> {
        self.column_values
            .iter()
            .map(|cv| (cv.id.as_str(), cv.text.as_deref().unwrap_or("")))
            .collect()
    }
}

/// A column value in the shape the board API accepts for writes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormattedValue {
    Date { date: String },
    Label { label: String },
    Labels { labels: Vec<String> },
    Text(String),
}

impl fmt::Display for FormattedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date { date } => write!(f, "{date}"),
            Self::Label { label } => write!(f, "{label}"),
            Self::Labels { labels } => write!(f, "{}", labels.join(", ")),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

pub type ColumnValues = BTreeMap<String, FormattedValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateItem {
    pub name: String,
    pub column_values: ColumnValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateItem {
    pub item_id: String,
    pub column_values: ColumnValues,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationPlan {
    pub creates: Vec<CreateItem>,
    pub updates: Vec<UpdateItem>,
}

impl MutationPlan {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// Result of one remote write. `target` is the item name for creates and
/// the item id for updates; `result` carries the remote item id or the error text.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    pub target: String,
    pub result: std::result::Result<String, String>,
}

impl MutationOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}
