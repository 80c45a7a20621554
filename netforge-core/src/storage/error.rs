//! Storage error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Failed to encode device properties: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Username already registered: {0}")]
    UsernameTaken(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
