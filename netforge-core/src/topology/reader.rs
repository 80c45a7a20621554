//! Topology reads

use super::error::{TopologyError, TopologyResult};
use crate::model::{ProjectId, Topology, UserId};
use crate::storage::{TopologyStore, TransactionBehavior};
use std::sync::Arc;

/// Loads the current topology of a project
#[derive(Clone)]
pub struct TopologyReader {
    store: Arc<TopologyStore>,
}

impl TopologyReader {
    pub fn new(store: Arc<TopologyStore>) -> Self {
        Self { store }
    }

    /// Devices and links of `project_id`, ordered by id, from one snapshot
    pub fn read(&self, project_id: ProjectId, owner_id: UserId) -> TopologyResult<Topology> {
        self.store
            .with_transaction(TransactionBehavior::Deferred, |tx| {
                if tx.find_owned_project(project_id, owner_id)?.is_none() {
                    return Err(TopologyError::NotFound);
                }

                Ok(Topology {
                    devices: tx.load_devices(project_id)?,
                    links: tx.load_links(project_id)?,
                })
            })
    }
}
