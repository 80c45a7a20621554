//! HTTP handlers

pub mod auth;
pub mod projects;
pub mod topology;

use crate::types::MessageResponse;
use axum::Json;

/// GET / - Greeting
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello from the netforge topology API".to_string(),
    })
}

/// GET /health - Liveness probe
pub async fn health() -> &'static str {
    "ok"
}
