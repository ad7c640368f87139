use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::models::{ColumnValues, MutationKind};
use crate::monday::MondayClient;
use crate::settings::Settings;
use crate::sync::{BoardReport, SyncService};

fn describe_columns(values: &ColumnValues) -> String {
    values
        .iter()
        .map(|(column, value)| format!("{column}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_board(report: &BoardReport, dry_run: bool) {
    println!(
        "\n{} (board {}): {} records, {} already on the board",
        report.record_type.to_string().bold(),
        report.board_id,
        report.records,
        report.fetched
    );
    if report.plan.is_empty() {
        println!("  Up to date.");
        return;
    }

    let mut rows: Vec<(MutationKind, &str, String)> = Vec::new();
    for create in &report.plan.creates {
        rows.push((MutationKind::Create, create.name.as_str(), describe_columns(&create.column_values)));
    }
    for update in &report.plan.updates {
        rows.push((MutationKind::Update, update.item_id.as_str(), describe_columns(&update.column_values)));
    }

    let mut table = Table::new();
    table.set_header(vec!["Action", "Item", "Columns", "Result"]);
    for (idx, (kind, target, columns)) in rows.into_iter().enumerate() {
        let result = if dry_run {
            Cell::new("planned")
        } else {
            match report.outcomes.get(idx).map(|o| &o.result) {
                Some(Ok(id)) => Cell::new(format!("ok ({id})").green()),
                Some(Err(e)) => Cell::new(e.red()),
                None => Cell::new("skipped"),
            }
        };
        table.add_row(vec![Cell::new(kind), Cell::new(target), Cell::new(columns), result]);
    }
    println!("{table}");
}

pub fn run(settings: &Settings, csv_path: &Path, dry_run: bool) -> Result<()> {
    settings.validate_for_sync()?;
    let client = MondayClient::new(settings)?;
    let report = SyncService::new(&client, settings).run(csv_path, dry_run)?;

    for board in report.boards() {
        print_board(board, report.dry_run);
    }

    println!();
    if report.dry_run {
        println!("Dry run: nothing was written.");
    } else if report.failed() == 0 {
        println!("{}", "Sync of CSV to monday.com complete.".green());
    } else {
        println!(
            "{}",
            format!(
                "Sync of CSV to monday.com complete with {} failed writes (see log).",
                report.failed()
            )
            .yellow()
        );
    }
    Ok(())
}
