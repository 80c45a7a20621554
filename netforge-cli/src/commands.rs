//! Command implementations

use anyhow::{anyhow, bail, Context, Result};
use netforge_core::model::{ProjectId, TopologySpec, User};
use netforge_core::topology::{ReplacementEngine, TopologyError, TopologyReader};
use netforge_core::{LinkPolicy, TopologyStore};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

fn find_user(store: &TopologyStore, username: &str) -> Result<User> {
    store
        .find_user_by_name(username)?
        .ok_or_else(|| anyhow!("no such user: {username}"))
}

fn not_found(err: TopologyError, project_id: ProjectId, username: &str) -> anyhow::Error {
    match err {
        TopologyError::NotFound => anyhow!("project {project_id} not found for user {username}"),
        other => other.into(),
    }
}

/// Report the schema version after migrations have run
pub fn migrate(store: &TopologyStore, out: &mut impl Write) -> Result<()> {
    let version = store.schema_version()?;
    info!(version, "database schema is current");
    writeln!(out, "schema version {version}")?;
    Ok(())
}

/// List a user's projects, one per line
pub fn list_projects(
    store: &TopologyStore,
    username: &str,
    skip: u32,
    limit: u32,
    out: &mut impl Write,
) -> Result<()> {
    let user = find_user(store, username)?;
    let projects = store.list_projects(user.id, skip, limit)?;

    for project in &projects {
        writeln!(
            out,
            "{}\t{}\t{}",
            project.id,
            project.name,
            project.description.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

/// Write a project's topology as a replacement payload
///
/// Durable device ids become client ids, so the output can be fed back to
/// [`import_topology`].
pub fn export_topology(
    store: Arc<TopologyStore>,
    username: &str,
    project_id: ProjectId,
    out: &mut impl Write,
) -> Result<()> {
    let user = find_user(&store, username)?;
    let topology = TopologyReader::new(store)
        .read(project_id, user.id)
        .map_err(|e| not_found(e, project_id, username))?;

    serde_json::to_writer_pretty(&mut *out, &topology.to_spec())?;
    writeln!(out)?;
    Ok(())
}

/// Replace a project's topology with the payload in `file`
pub fn import_topology(
    store: Arc<TopologyStore>,
    policy: LinkPolicy,
    username: &str,
    project_id: ProjectId,
    file: &Path,
    out: &mut impl Write,
) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let spec: TopologySpec = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", file.display()))?;

    let user = find_user(&store, username)?;
    let replaced = match ReplacementEngine::new(store, policy).replace(
        project_id,
        user.id,
        &spec.devices,
        &spec.links,
    ) {
        Ok(replaced) => replaced,
        Err(TopologyError::UnresolvedLinks(refs)) => {
            for reference in &refs {
                writeln!(out, "unresolved {reference}")?;
            }
            bail!("{} link(s) reference unknown client ids; nothing was changed", refs.len());
        }
        Err(e) => return Err(not_found(e, project_id, username)),
    };

    for reference in &replaced.unresolved_links {
        warn!("skipped {}", reference);
    }
    writeln!(
        out,
        "project {}: {} devices, {} links ({} dropped)",
        replaced.project.id,
        replaced.devices.len(),
        replaced.links.len(),
        replaced.unresolved_links.len()
    )?;
    Ok(())
}
