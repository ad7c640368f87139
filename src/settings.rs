use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::models::{BoardMapping, RecordType, KEY_COLUMN};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub projects_board_id: u64,
    #[serde(default)]
    pub subtasks_board_id: u64,
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
    #[serde(default)]
    pub project_board_mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub subtask_board_mapping: BTreeMap<String, String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_endpoint() -> String {
    "https://api.monday.com/v2".to_string()
}

fn default_api_version() -> String {
    "2024-10".to_string()
}

fn default_csv_path() -> String {
    "sample.csv".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> usize {
    200
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            api_token: String::new(),
            api_version: default_api_version(),
            projects_board_id: 0,
            subtasks_board_id: 0,
            csv_path: default_csv_path(),
            project_board_mapping: BTreeMap::new(),
            subtask_board_mapping: BTreeMap::new(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Starter file for `boardsync init`: a `Key` entry per board so the
    /// fetcher has a key column to look items up by.
    pub fn template(csv_path: Option<&str>) -> Self {
        let mut settings = Self::default();
        if let Some(path) = csv_path {
            settings.csv_path = path.to_string();
        }
        for mapping in [
            &mut settings.project_board_mapping,
            &mut settings.subtask_board_mapping,
        ] {
            mapping.insert(KEY_COLUMN.to_string(), "text_key".to_string());
            mapping.insert("Status".to_string(), "color_status".to_string());
            mapping.insert("Due Date".to_string(), "date_due".to_string());
            mapping.insert("Labels".to_string(), "dropdown_labels".to_string());
        }
        settings
    }

    pub fn board_id(&self, record_type: RecordType) -> u64 {
        match record_type {
            RecordType::Project => self.projects_board_id,
            RecordType::Subtask => self.subtasks_board_id,
        }
    }

    /// Raw `CSV column -> board column id` entries for one record type.
    pub fn mapping_config(&self, record_type: RecordType) -> &BTreeMap<String, String> {
        match record_type {
            RecordType::Project => &self.project_board_mapping,
            RecordType::Subtask => &self.subtask_board_mapping,
        }
    }

    pub fn board_mapping(&self, record_type: RecordType) -> Result<BoardMapping> {
        BoardMapping::from_config(record_type, self.mapping_config(record_type))
    }

    /// Environment wins over the settings file. `lookup` is `std::env::var`
    /// outside of tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("MONDAY_API_TOKEN") {
            self.api_token = token;
        }
        if let Some(endpoint) = lookup("MONDAY_API_ENDPOINT") {
            self.api_endpoint = endpoint;
        }
        if let Some(path) = lookup("SYNC_CSV_PATH") {
            self.csv_path = path;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        for (var, target) in [
            ("PROJECTS_BOARD_ID", &mut self.projects_board_id),
            ("SUBTASKS_BOARD_ID", &mut self.subtasks_board_id),
        ] {
            if let Some(raw) = lookup(var) {
                *target = raw
                    .trim()
                    .parse()
                    .map_err(|_| SyncError::Settings(format!("{var} is not a board id: '{raw}'")))?;
            }
        }
        Ok(())
    }

    /// Check everything a live sync needs.
    pub fn validate_for_sync(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(SyncError::Settings(
                "No API token. Set MONDAY_API_TOKEN or api_token in settings.".to_string(),
            ));
        }
        if self.projects_board_id == 0 || self.subtasks_board_id == 0 {
            return Err(SyncError::Settings(
                "projects_board_id and subtasks_board_id must both be set.".to_string(),
            ));
        }
        if self.page_size == 0 || self.max_pages == 0 {
            return Err(SyncError::Settings(
                "page_size and max_pages must be greater than zero.".to_string(),
            ));
        }
        for record_type in [RecordType::Project, RecordType::Subtask] {
            self.board_mapping(record_type)?;
        }
        Ok(())
    }
}

pub fn default_settings_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("boardsync")
        .join("settings.json")
}

/// Missing file -> defaults; unreadable or malformed file -> error.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| SyncError::Settings(format!("{}: {e}", path.display())))
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SyncError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

/// File settings with `.env` and process environment layered on top.
pub fn resolve_settings(path: &Path) -> Result<Settings> {
    let _ = dotenvy::dotenv();
    let mut settings = load_settings(path)?;
    settings.apply_env_overrides(|var| std::env::var(var).ok())?;
    Ok(settings)
}

/// Show only the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        return "(not set)".to_string();
    }
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = Settings::template(Some("export.csv"));
        settings.projects_board_id = 42;
        save_settings(&path, &settings).unwrap();
        let loaded = load_settings(&path).unwrap();
        assert_eq!(loaded.projects_board_id, 42);
        assert_eq!(loaded.csv_path, "export.csv");
        assert_eq!(loaded.project_board_mapping.get("Key").map(String::as_str), Some("text_key"));
    }

    #[test]
    fn test_mapping_config_per_record_type() {
        let mut settings = Settings::template(None);
        settings
            .subtask_board_mapping
            .insert("Key".to_string(), "text_subtask_key".to_string());
        assert_eq!(settings.mapping_config(RecordType::Project)["Key"], "text_key");
        assert_eq!(settings.mapping_config(RecordType::Subtask)["Key"], "text_subtask_key");
        let mapping = settings.board_mapping(RecordType::Subtask).unwrap();
        assert_eq!(mapping.key_column_id, "text_subtask_key");
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings(&dir.path().join("absent.json")).unwrap();
        assert_eq!(s.api_endpoint, "https://api.monday.com/v2");
        assert_eq!(s.page_size, 100);
        assert!(s.project_board_mapping.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"api_token": "abc", "projects_board_id": 7}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.api_token, "abc");
        assert_eq!(s.projects_board_id, 7);
        assert_eq!(s.max_pages, 200);
        assert_eq!(s.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_settings(&path), Err(SyncError::Settings(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("MONDAY_API_TOKEN", "secret-token"),
            ("PROJECTS_BOARD_ID", " 123 "),
            ("SYNC_CSV_PATH", "/tmp/export.csv"),
        ]);
        let mut s = Settings::default();
        s.apply_env_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(s.api_token, "secret-token");
        assert_eq!(s.projects_board_id, 123);
        assert_eq!(s.subtasks_board_id, 0);
        assert_eq!(s.csv_path, "/tmp/export.csv");
    }

    #[test]
    fn test_env_override_rejects_bad_board_id() {
        let mut s = Settings::default();
        let err = s
            .apply_env_overrides(|k| (k == "SUBTASKS_BOARD_ID").then(|| "abc".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("SUBTASKS_BOARD_ID"));
    }

    #[test]
    fn test_validate_for_sync() {
        let mut s = Settings::template(None);
        assert!(s.validate_for_sync().is_err());
        s.api_token = "t".into();
        s.projects_board_id = 1;
        s.subtasks_board_id = 2;
        s.validate_for_sync().unwrap();
        s.subtask_board_mapping.remove("Key");
        assert!(matches!(
            s.validate_for_sync(),
            Err(SyncError::MissingKeyMapping(RecordType::Subtask))
        ));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(not set)");
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("eyJhbGciOi1234"), "****1234");
    }
}
