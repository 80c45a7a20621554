//! Async facade over the topology store
//!
//! SQLite calls block, so every operation is shipped to the blocking pool
//! with `spawn_blocking` and awaited from there.

use super::engine::ReplacementEngine;
use super::error::{TopologyError, TopologyResult};
use super::reader::TopologyReader;
use super::resolve::LinkPolicy;
use crate::model::{
    Project, ProjectDraft, ProjectId, ProjectUpdate, ReplacedTopology, Topology, TopologySpec,
    UserId,
};
use crate::storage::TopologyStore;
use std::sync::Arc;

/// Default page size for project listings
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

async fn run_blocking<T, F>(f: F) -> TopologyResult<T>
where
    F: FnOnce() -> TopologyResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Project and topology operations, all scoped to an owner
#[derive(Clone)]
pub struct TopologyService {
    store: Arc<TopologyStore>,
    engine: ReplacementEngine,
    reader: TopologyReader,
}

impl TopologyService {
    pub fn new(store: Arc<TopologyStore>, policy: LinkPolicy) -> Self {
        Self {
            engine: ReplacementEngine::new(Arc::clone(&store), policy),
            reader: TopologyReader::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn store(&self) -> &Arc<TopologyStore> {
        &self.store
    }

    pub fn link_policy(&self) -> LinkPolicy {
        self.engine.policy()
    }

    // ===== Topology =====

    pub async fn replace_topology(
        &self,
        project_id: ProjectId,
        owner_id: UserId,
        spec: TopologySpec,
    ) -> TopologyResult<ReplacedTopology> {
        let engine = self.engine.clone();
        run_blocking(move || engine.replace(project_id, owner_id, &spec.devices, &spec.links)).await
    }

    pub async fn read_topology(&self, project_id: ProjectId, owner_id: UserId) -> TopologyResult<Topology> {
        let reader = self.reader.clone();
        run_blocking(move || reader.read(project_id, owner_id)).await
    }

    // ===== Projects =====

    pub async fn create_project(&self, owner_id: UserId, draft: ProjectDraft) -> TopologyResult<Project> {
        let store = Arc::clone(&self.store);
        run_blocking(move || Ok(store.create_project(owner_id, &draft)?)).await
    }

    pub async fn list_projects(&self, owner_id: UserId, skip: u32, limit: u32) -> TopologyResult<Vec<Project>> {
        let store = Arc::clone(&self.store);
        run_blocking(move || Ok(store.list_projects(owner_id, skip, limit)?)).await
    }

    pub async fn get_project(&self, project_id: ProjectId, owner_id: UserId) -> TopologyResult<Project> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.get_project(project_id, owner_id)?.ok_or(TopologyError::NotFound)).await
    }

    pub async fn update_project(
        &self,
        project_id: ProjectId,
        owner_id: UserId,
        update: ProjectUpdate,
    ) -> TopologyResult<Project> {
        let store = Arc::clone(&self.store);
        run_blocking(move || {
            store
                .update_project(project_id, owner_id, &update)?
                .ok_or(TopologyError::NotFound)
        })
        .await
    }

    /// Delete a project with its devices and links, returning it as it was
    pub async fn delete_project(&self, project_id: ProjectId, owner_id: UserId) -> TopologyResult<Project> {
        let store = Arc::clone(&self.store);
        run_blocking(move || {
            store
                .delete_project(project_id, owner_id)?
                .ok_or(TopologyError::NotFound)
        })
        .await
    }
}
