//! Error types for the TSV-to-SQLite pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid identifier {identifier:?}: {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    #[error("Schema mismatch: {header} header names for {types} column types")]
    SchemaMismatch { header: usize, types: usize },

    #[error("Input is empty: no header record found")]
    EmptyInput,

    #[error("Not enough data rows: expected {expected}, found {found}")]
    NotEnoughRows { expected: usize, found: usize },

    #[error("Row {row} is too short: expected at least {expected} fields, found {found}")]
    RowTooShort { row: usize, expected: usize, found: usize },
}

impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
