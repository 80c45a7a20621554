//! netforge core
//!
//! Persistence and domain logic for the netforge topology designer: users,
//! projects, and the devices and links that make up a project's network
//! diagram.
//!
//! The central operation is [`topology::ReplacementEngine::replace`], which
//! swaps a project's whole graph for a client payload in one transaction.

pub mod config;
pub mod credentials;
pub mod logging;
pub mod model;
pub mod storage;
pub mod topology;

pub use config::Config;
pub use credentials::{AccessToken, AccountService, CredentialError, CredentialService};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogLevel};
pub use storage::{StoreError, TopologyStore};
pub use topology::{LinkPolicy, TopologyError, TopologyService};
