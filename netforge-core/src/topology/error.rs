//! Topology error types

use crate::model::UnresolvedLinkReference;
use crate::storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    /// Project does not exist or belongs to someone else
    #[error("Project not found")]
    NotFound,

    #[error("{} link(s) reference unknown client ids", .0.len())]
    UnresolvedLinks(Vec<UnresolvedLinkReference>),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for TopologyError {
    fn from(e: tokio::task::JoinError) -> Self {
        TopologyError::Task(e.to_string())
    }
}

pub type TopologyResult<T> = Result<T, TopologyError>;
