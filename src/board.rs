use serde::Deserialize;

use crate::error::Result;
use crate::models::{ColumnValues, RemoteItem};

/// One page request against a board, looking items up by key column.
#[derive(Debug, Clone, Copy)]
pub struct ItemsPageQuery<'a> {
    pub board_id: u64,
    pub key_column_id: &'a str,
    pub keys: &'a [String],
    pub cursor: Option<&'a str>,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemsPage {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub items: Vec<RemoteItem>,
}

/// The remote board service as the sync engine sees it: one paginated read
/// and two writes. Implementations report network failures as
/// `SyncError::Transport` and error payloads as `SyncError::RemoteApplication`.
pub trait BoardApi {
    fn items_page(&self, query: &ItemsPageQuery<'_>) -> Result<ItemsPage>;

    /// Returns the id of the new item.
    fn create_item(&self, board_id: u64, item_name: &str, column_values: &ColumnValues) -> Result<String>;

    /// Replaces only the listed columns. Returns the item id.
    fn update_item(&self, board_id: u64, item_id: &str, column_values: &ColumnValues) -> Result<String>;
}
