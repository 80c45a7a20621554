//! Project topologies
//!
//! - [`ReplacementEngine`] rebuilds a project's graph from a client payload
//! - [`TopologyReader`] loads the current graph
//! - [`TopologyService`] drives both, plus project CRUD, from async code

pub mod engine;
pub mod error;
pub mod reader;
pub mod resolve;
pub mod service;

pub use engine::ReplacementEngine;
pub use error::{TopologyError, TopologyResult};
pub use reader::TopologyReader;
pub use resolve::{ClientIdMap, LinkPolicy};
pub use service::{TopologyService, DEFAULT_PAGE_LIMIT};
