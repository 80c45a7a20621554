//! Mapping of domain errors onto HTTP responses

use crate::types::ErrorResponse;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use netforge_core::model::UnresolvedLinkReference;
use netforge_core::{CredentialError, StoreError, TopologyError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Project not found")]
    NotFound,

    #[error("Username already registered")]
    UsernameTaken,

    #[error("Topology links reference unknown devices")]
    UnresolvedLinks(Vec<UnresolvedLinkReference>),

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthorized,

    /// Details are logged, never sent to the client
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::UsernameTaken => StatusCode::BAD_REQUEST,
            ApiError::UnresolvedLinks(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UsernameTaken(_) => ApiError::UsernameTaken,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<TopologyError> for ApiError {
    fn from(err: TopologyError) -> Self {
        match err {
            TopologyError::NotFound => ApiError::NotFound,
            TopologyError::UnresolvedLinks(refs) => ApiError::UnresolvedLinks(refs),
            TopologyError::Store(e) => e.into(),
            TopologyError::Task(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidCredentials => ApiError::InvalidCredentials,
            CredentialError::InvalidToken => ApiError::Unauthorized,
            CredentialError::Store(e) => e.into(),
            CredentialError::Hashing(msg) | CredentialError::Task(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let details = match &self {
            ApiError::UnresolvedLinks(refs) => Some(json!(refs
                .iter()
                .map(|r| json!({
                    "index": r.index,
                    "source_client_id": r.source_client_id,
                    "target_client_id": r.target_client_id,
                    "message": r.to_string(),
                }))
                .collect::<Vec<_>>())),
            ApiError::Internal(cause) => {
                error!(%cause, "request failed");
                None
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            details,
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
