//! Credential error types

use crate::storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Unknown user or wrong password; the two are not distinguished
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Malformed, forged or expired token, or one whose subject is gone
    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for CredentialError {
    fn from(e: tokio::task::JoinError) -> Self {
        CredentialError::Task(e.to_string())
    }
}

pub type CredentialResult<T> = Result<T, CredentialError>;
