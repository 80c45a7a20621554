//! HTTP API for netforge
//!
//! Routes are built by [`build_router`] over a shared [`AppState`]; the
//! binary wires configuration, logging and the SQLite store around it.

pub mod api;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;
pub mod state;
pub mod types;

pub use api::build_router;
pub use error::{ApiError, ApiResult};
pub use server::ApiServer;
pub use state::AppState;
