//! Topology replacement
//!
//! A replacement throws away a project's devices and links and rebuilds them
//! from a client payload, inside a single IMMEDIATE transaction. Readers see
//! either the old graph or the new one.

use super::error::{TopologyError, TopologyResult};
use super::resolve::{ClientIdMap, LinkPolicy};
use crate::model::{
    DeviceSpec, LinkSpec, ProjectId, ReplacedTopology, Timestamp, UnresolvedLinkReference, UserId,
};
use crate::storage::{StoreTransaction, TopologyStore, TransactionBehavior};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Replaces whole project topologies
#[derive(Clone)]
pub struct ReplacementEngine {
    store: Arc<TopologyStore>,
    policy: LinkPolicy,
}

impl ReplacementEngine {
    pub fn new(store: Arc<TopologyStore>, policy: LinkPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> LinkPolicy {
        self.policy
    }

    /// Replace the topology of `project_id` with `devices` and `links`.
    ///
    /// Fails with [`TopologyError::NotFound`] before writing anything if
    /// `owner_id` does not own the project. Under [`LinkPolicy::Strict`] any
    /// unresolved link fails the call with [`TopologyError::UnresolvedLinks`];
    /// otherwise such links are dropped and listed in
    /// [`ReplacedTopology::unresolved_links`].
    pub fn replace(
        &self,
        project_id: ProjectId,
        owner_id: UserId,
        devices: &[DeviceSpec],
        links: &[LinkSpec],
    ) -> TopologyResult<ReplacedTopology> {
        let replaced = self.store.with_transaction(TransactionBehavior::Immediate, |tx| {
            self.replace_in(tx, project_id, owner_id, devices, links)
        })?;

        info!(
            project_id = %project_id,
            devices = replaced.devices.len(),
            links = replaced.links.len(),
            dropped_links = replaced.unresolved_links.len(),
            "replaced project topology"
        );

        Ok(replaced)
    }

    fn replace_in(
        &self,
        tx: &StoreTransaction<'_>,
        project_id: ProjectId,
        owner_id: UserId,
        devices: &[DeviceSpec],
        links: &[LinkSpec],
    ) -> TopologyResult<ReplacedTopology> {
        if tx.find_owned_project(project_id, owner_id)?.is_none() {
            return Err(TopologyError::NotFound);
        }

        // Links first; they reference the devices.
        let removed_links = tx.delete_links(project_id)?;
        let removed_devices = tx.delete_devices(project_id)?;
        debug!(
            project_id = %project_id,
            removed_devices,
            removed_links,
            "cleared previous topology"
        );

        let mut client_ids = ClientIdMap::new();
        for spec in devices {
            let device_id = tx.insert_device(project_id, spec)?;
            if let Some(client_id) = &spec.client_id {
                if let Some(shadowed) = client_ids.bind(client_id.as_str(), device_id) {
                    debug!(%client_id, %shadowed, now = %device_id, "duplicate client id rebound");
                }
            }
        }

        let mut unresolved: Vec<UnresolvedLinkReference> = Vec::new();
        for (index, spec) in links.iter().enumerate() {
            match client_ids.resolve(index, spec) {
                Ok((source, target)) => {
                    tx.insert_link(
                        project_id,
                        source,
                        target,
                        spec.source_port.as_deref(),
                        spec.target_port.as_deref(),
                    )?;
                }
                Err(reference) => unresolved.push(reference),
            }
        }

        if !unresolved.is_empty() {
            match self.policy {
                LinkPolicy::Strict => {
                    warn!(
                        project_id = %project_id,
                        count = unresolved.len(),
                        "rejecting topology with unresolved links"
                    );
                    return Err(TopologyError::UnresolvedLinks(unresolved));
                }
                LinkPolicy::Lenient => {
                    for reference in &unresolved {
                        warn!(project_id = %project_id, "dropping {}", reference);
                    }
                }
            }
        }

        tx.touch_project(project_id, Timestamp::now())?;

        let project = tx
            .find_owned_project(project_id, owner_id)?
            .ok_or(TopologyError::NotFound)?;

        Ok(ReplacedTopology {
            project,
            devices: tx.load_devices(project_id)?,
            links: tx.load_links(project_id)?,
            unresolved_links: unresolved,
        })
    }
}
