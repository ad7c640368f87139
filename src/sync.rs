use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::board::BoardApi;
use crate::error::Result;
use crate::executor::execute_mutations;
use crate::fetcher::{fetch_items, PageLimits};
use crate::loader::load_and_filter;
use crate::models::{MutationOutcome, MutationPlan, Record, RecordType};
use crate::planner::plan_mutations;
use crate::settings::Settings;

/// What happened to one record type on its board.
#[derive(Debug, Clone)]
pub struct BoardReport {
    pub record_type: RecordType,
    pub board_id: u64,
    pub records: usize,
    pub fetched: usize,
    pub plan: MutationPlan,
    /// Empty on a dry run.
    pub outcomes: Vec<MutationOutcome>,
}

impl BoardReport {
    fn empty(record_type: RecordType, board_id: u64) -> Self {
        Self {
            record_type,
            board_id,
            records: 0,
            fetched: 0,
            plan: MutationPlan::default(),
            outcomes: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded()).count()
    }
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub projects: BoardReport,
    pub subtasks: BoardReport,
    pub dry_run: bool,
}

impl SyncReport {
    pub fn boards(&self) -> [&BoardReport; 2] {
        [&self.projects, &self.subtasks]
    }

    pub fn failed(&self) -> usize {
        self.boards().iter().map(|b| b.failed()).sum()
    }
}

pub struct SyncService<'a> {
    api: &'a dyn BoardApi,
    settings: &'a Settings,
}

impl<'a> SyncService<'a> {
    pub fn new(api: &'a dyn BoardApi, settings: &'a Settings) -> Self {
        Self { api, settings }
    }

    fn limits(&self) -> PageLimits {
        PageLimits {
            page_size: self.settings.page_size,
            max_pages: self.settings.max_pages,
        }
    }

    /// Fetch, diff and (unless `dry_run`) write one partition. Only a broken
    /// board mapping is an error; remote failures end up in the report.
    pub fn sync_records(
        &self,
        record_type: RecordType,
        records: &[Record],
        dry_run: bool,
    ) -> Result<BoardReport> {
        let board_id = self.settings.board_id(record_type);
        let mapping = self.settings.board_mapping(record_type)?;
        if records.is_empty() {
            info!("No {record_type} records to sync");
            return Ok(BoardReport::empty(record_type, board_id));
        }

        info!(board_id, "Processing {} {record_type} records", records.len());
        let mut seen = HashSet::new();
        let keys: Vec<String> = records
            .iter()
            .map(|r| r.key.as_str())
            .filter(|key| !key.is_empty() && seen.insert(*key))
            .map(str::to_string)
            .collect();
        let existing = fetch_items(self.api, board_id, &mapping.key_column_id, &keys, self.limits());
        let plan = plan_mutations(records, &mapping, &existing);

        let outcomes = if dry_run {
            Vec::new()
        } else {
            execute_mutations(self.api, board_id, &plan.creates, &plan.updates)
        };
        info!(board_id, "Finished processing {record_type} records");

        Ok(BoardReport {
            record_type,
            board_id,
            records: records.len(),
            fetched: existing.len(),
            plan,
            outcomes,
        })
    }

    /// Load the export, then sync projects followed by sub-tasks. A missing
    /// export is an empty run; a malformed one is an error.
    pub fn run(&self, csv_path: &Path, dry_run: bool) -> Result<SyncReport> {
        let (projects, subtasks) = load_and_filter(csv_path)?.into_partitions()?;
        info!("CSV Projects: {}, Subtasks: {}", projects.len(), subtasks.len());

        let projects = self.sync_records(RecordType::Project, &projects, dry_run)?;
        let subtasks = self.sync_records(RecordType::Subtask, &subtasks, dry_run)?;
        Ok(SyncReport {
            projects,
            subtasks,
            dry_run,
        })
    }
}
