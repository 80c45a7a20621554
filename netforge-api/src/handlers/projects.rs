//! Project CRUD handlers

use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::state::AppState;
use crate::types::ListParams;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use netforge_core::model::{Project, ProjectDraft, ProjectId, ProjectUpdate};
use netforge_core::topology::DEFAULT_PAGE_LIMIT;
use std::sync::Arc;

/// POST /projects - Create a project owned by the caller
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(draft): Json<ProjectDraft>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.topology.create_project(user.id, draft).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /projects - The caller's projects, paginated
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state
        .topology
        .list_projects(
            user.id,
            params.skip.unwrap_or(0),
            params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        )
        .await?;
    Ok(Json(projects))
}

/// GET /projects/:id
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.topology.get_project(project_id, user.id).await?))
}

/// PUT /projects/:id - Change name and/or description
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
    Json(update): Json<ProjectUpdate>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.topology.update_project(project_id, user.id, update).await?))
}

/// DELETE /projects/:id - Delete a project with its topology
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.topology.delete_project(project_id, user.id).await?))
}
