use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use crate::board::{BoardApi, ItemsPageQuery};
use crate::models::RemoteItem;

#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub page_size: u32,
    /// Hard stop for a service that never hands back an empty cursor.
    pub max_pages: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 200,
        }
    }
}

/// Look up existing board items for `keys`, indexed by the text of their
/// key column. Items without a key value are skipped.
///
/// Any failed page (transport or error payload) ends the walk; whatever was
/// collected so far is returned.
pub fn fetch_items(
    api: &dyn BoardApi,
    board_id: u64,
    key_column_id: &str,
    keys: &[String],
    limits: PageLimits,
) -> HashMap<String, RemoteItem> {
    let mut items = HashMap::new();
    if keys.is_empty() {
        return items;
    }

    let mut cursor: Option<String> = None;
    for page_no in 1..=limits.max_pages {
        let query = ItemsPageQuery {
            board_id,
            key_column_id,
            keys,
            cursor: cursor.as_deref(),
            limit: limits.page_size,
        };
        let page = match api.items_page(&query) {
            Ok(page) => page,
            Err(e) => {
                error!(board_id, page = page_no, "Fetching board items failed: {e}");
                return items;
            }
        };

        for item in page.items {
            let key = item
                .text_of(key_column_id)
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string);
            match key {
                Some(key) => {
                    items.insert(key, item);
                }
                None => debug!(board_id, item_id = %item.id, "Item has no key value, skipping"),
            }
        }

        match page.cursor.filter(|c| !c.is_empty()) {
            Some(next) => cursor = Some(next),
            None => {
                info!(board_id, pages = page_no, "Fetched {} existing items", items.len());
                return items;
            }
        }
    }

    warn!(
        board_id,
        "Stopped paging after {} pages; using {} items fetched so far",
        limits.max_pages,
        items.len()
    );
    items
}
