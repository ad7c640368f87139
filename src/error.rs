use thiserror::Error;

use crate::models::RecordType;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network or HTTP-status failure talking to the board service.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The board service answered, but with an error payload.
    #[error("Remote error: {0}")]
    RemoteApplication(String),

    #[error("CSV missing '{0}' column")]
    MissingColumn(String),

    #[error("Could not parse date '{0}'")]
    DateParse(String),

    #[error("No 'Key' column in the {0} board mapping")]
    MissingKeyMapping(RecordType),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
