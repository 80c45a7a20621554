//! Storage layer
//!
//! SQL persistence for users, projects, devices and links.

pub mod error;
pub mod migrations;
pub mod sql_store;
pub mod transaction;

pub use error::{StoreError, StoreResult};
pub use migrations::{migrate, CURRENT_SCHEMA_VERSION};
pub use sql_store::TopologyStore;
pub use transaction::StoreTransaction;

pub use rusqlite::TransactionBehavior;
