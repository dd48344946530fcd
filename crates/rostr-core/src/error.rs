//! Error types for rostr

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Backup not found: {0}")]
    BackupNotFound(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
