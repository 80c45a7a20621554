//! Topology handlers

use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use netforge_core::model::{ProjectId, ReplacedTopology, Topology, TopologySpec};
use std::sync::Arc;

/// PUT /projects/:id/topology - Replace the whole device/link graph
pub async fn replace_topology(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
    Json(spec): Json<TopologySpec>,
) -> ApiResult<Json<ReplacedTopology>> {
    let replaced = state
        .topology
        .replace_topology(project_id, user.id, spec)
        .await?;
    Ok(Json(replaced))
}

/// GET /projects/:id/topology
pub async fn read_topology(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Topology>> {
    Ok(Json(state.topology.read_topology(project_id, user.id).await?))
}
