//! API routes definition

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/token", post(handlers::auth::login))
        .route("/auth/users/me", get(handlers::auth::me))
        // Project routes
        .route(
            "/projects",
            post(handlers::projects::create_project).get(handlers::projects::list_projects),
        )
        .route(
            "/projects/:id",
            get(handlers::projects::get_project)
                .put(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        // Topology routes
        .route(
            "/projects/:id/topology",
            get(handlers::topology::read_topology).put(handlers::topology::replace_topology),
        )
        .with_state(state)
}
