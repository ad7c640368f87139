use tracing::{error, info};

use crate::board::BoardApi;
use crate::models::{CreateItem, MutationKind, MutationOutcome, UpdateItem};

/// Apply a plan one item at a time. A failed write is logged and recorded;
/// it never stops the remaining writes.
pub fn execute_mutations(
    api: &dyn BoardApi,
    board_id: u64,
    creates: &[CreateItem],
    updates: &[UpdateItem],
) -> Vec<MutationOutcome> {
    let mut outcomes = Vec::with_capacity(creates.len() + updates.len());

    for create in creates {
        let result = match api.create_item(board_id, &create.name, &create.column_values) {
            Ok(id) => {
                info!(board_id, item_id = %id, "Created '{}'", create.name);
                Ok(id)
            }
            Err(e) => {
                error!(board_id, "Failed to create '{}': {e}", create.name);
                Err(e.to_string())
            }
        };
        outcomes.push(MutationOutcome {
            kind: MutationKind::Create,
            target: create.name.clone(),
            result,
        });
    }

    for update in updates {
        let result = match api.update_item(board_id, &update.item_id, &update.column_values) {
            Ok(id) => {
                info!(board_id, item_id = %id, "Updated {} columns", update.column_values.len());
                Ok(id)
            }
            Err(e) => {
                error!(board_id, item_id = %update.item_id, "Failed to update item: {e}");
                Err(e.to_string())
            }
        };
        outcomes.push(MutationOutcome {
            kind: MutationKind::Update,
            target: update.item_id.clone(),
            result,
        });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fake::FakeBoard;
    use crate::models::{ColumnValues, FormattedValue};

    fn label(value: &str) -> ColumnValues {
        ColumnValues::from([(
            "color_1".to_string(),
            FormattedValue::Label {
                label: value.to_string(),
            },
        )])
    }

    fn create(name: &str) -> CreateItem {
        CreateItem {
            name: name.to_string(),
            column_values: label("Open"),
        }
    }

    fn update(id: &str) -> UpdateItem {
        UpdateItem {
            item_id: id.to_string(),
            column_values: label("Done"),
        }
    }

    #[test]
    fn test_one_call_per_entry() {
        let board = FakeBoard::new();
        let outcomes = execute_mutations(&board, 3, &[create("A"), create("B")], &[update("9")]);

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(MutationOutcome::succeeded));
        let creates = board.creates.borrow();
        assert_eq!(creates.len(), 2);
        assert_eq!(creates[0], (3, "A".to_string(), label("Open")));
        assert_eq!(board.updates.borrow()[0], (3, "9".to_string(), label("Done")));
        assert_eq!(outcomes[2].kind, MutationKind::Update);
        assert_eq!(outcomes[2].result, Ok("9".to_string()));
    }

    #[test]
    fn test_failures_are_isolated() {
        let board = FakeBoard::new().failing_create("B").failing_update("8");
        let outcomes = execute_mutations(
            &board,
            3,
            &[create("A"), create("B"), create("C")],
            &[update("8"), update("9")],
        );

        assert_eq!(board.creates.borrow().len(), 3);
        assert_eq!(board.updates.borrow().len(), 2);
        let failed: Vec<_> = outcomes
            .iter()
            .filter(|o| !o.succeeded())
            .map(|o| (o.kind, o.target.as_str()))
            .collect();
        assert_eq!(failed, [(MutationKind::Create, "B"), (MutationKind::Update, "8")]);
        assert!(outcomes[1].result.as_ref().unwrap_err().contains("cannot create B"));
    }

    #[test]
    fn test_empty_plan_makes_no_calls() {
        let board = FakeBoard::new();
        assert!(execute_mutations(&board, 3, &[], &[]).is_empty());
        assert!(board.creates.borrow().is_empty());
    }
}
