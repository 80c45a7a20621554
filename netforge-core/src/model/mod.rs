//! Data model shared by the store, the topology engine and the API

pub mod project;
pub mod topology;
pub mod types;

pub use project::{Project, ProjectDraft, ProjectUpdate, User};
pub use topology::{
    Device, DeviceSpec, Link, LinkSpec, Properties, ReplacedTopology, Topology, TopologySpec,
    UnresolvedLinkReference,
};
pub use types::{DeviceId, LinkId, ProjectId, Timestamp, UserId};
