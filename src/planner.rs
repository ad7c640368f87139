use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::models::{BoardMapping, ColumnValues, CreateItem, MutationPlan, Record, RemoteItem, UpdateItem};
use crate::normalize::{compare_values, format_for_mutation};

/// Columns whose CSV value differs from the item's current text.
fn changed_columns(record: &Record, mapping: &BoardMapping, item: &RemoteItem) -> ColumnValues {
    let remote = item.column_texts();
    let mut changed = ColumnValues::new();
    for column in &mapping.columns {
        let Some(source) = record.get(&column.source) else {
            continue;
        };
        let current = remote.get(column.column_id.as_str()).copied();
        let (differs, normalized) = compare_values(Some(source), current, column.kind);
        if !differs {
            continue;
        }
        debug!(
            key = %record.key,
            item = %item.name,
            column = %column.column_id,
            "'{}' -> '{normalized}'",
            current.unwrap_or("")
        );
        if let Some(value) = format_for_mutation(Some(source), column.kind) {
            changed.insert(column.column_id.clone(), value);
        }
    }
    changed
}

fn new_columns(record: &Record, mapping: &BoardMapping) -> ColumnValues {
    mapping
        .columns
        .iter()
        .filter_map(|column| {
            let value = format_for_mutation(record.get(&column.source), column.kind)?;
            Some((column.column_id.clone(), value))
        })
        .collect()
}

/// Diff `records` against the items already on the board.
///
/// Records with a matching item become updates carrying only the changed
/// columns (none at all if nothing changed); the rest become creates.
///
/// A key repeated in `records` is planned once, from its first row. Rows
/// with an empty key can never match an item, so they are always creates.
pub fn plan_mutations(
    records: &[Record],
    mapping: &BoardMapping,
    remote_items: &HashMap<String, RemoteItem>,
) -> MutationPlan {
    let mut plan = MutationPlan::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for record in records {
        if !record.key.is_empty() && !seen.insert(record.key.as_str()) {
            warn!(key = %record.key, "Skipping duplicate {} row", record.record_type);
            continue;
        }
        let existing = match record.key.as_str() {
            "" => None,
            key => remote_items.get(key),
        };
        match existing {
            Some(item) => {
                let column_values = changed_columns(record, mapping, item);
                if !column_values.is_empty() {
                    plan.updates.push(UpdateItem {
                        item_id: item.id.clone(),
                        column_values,
                    });
                }
            }
            None => {
                let name = match (record.name(), record.key.as_str()) {
                    ("", "") => {
                        warn!("Skipping {} row with neither a key nor a summary", record.record_type);
                        continue;
                    }
                    ("", key) => {
                        warn!(key = %key, "{} has no summary, naming the item after its key", record.record_type);
                        key.to_string()
                    }
                    (name, _) => name.to_string(),
                };
                plan.creates.push(CreateItem {
                    name,
                    column_values: new_columns(record, mapping),
                });
            }
        }
    }

    info!(
        "Planned {} {} creates and {} updates",
        plan.creates.len(),
        mapping.record_type,
        plan.updates.len()
    );
    plan
}
