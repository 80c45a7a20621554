//! Registration and login handlers

use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::state::AppState;
use crate::types::{LoginForm, RegisterRequest};
use axum::{extract::State, Form, Json};
use netforge_core::model::User;
use netforge_core::AccessToken;
use std::sync::Arc;

/// POST /auth/register - Create an account
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<User>> {
    let user = state.accounts.register(req.username, req.password).await?;
    Ok(Json(user))
}

/// POST /auth/token - Exchange form credentials for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<AccessToken>> {
    let token = state.accounts.authenticate(form.username, form.password).await?;
    Ok(Json(token))
}

/// GET /auth/users/me - The authenticated user
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
