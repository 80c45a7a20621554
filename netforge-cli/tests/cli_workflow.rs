//! Import/export workflows against an on-disk database

use anyhow::Result;
use netforge_cli::commands;
use netforge_core::config::StoreConfig;
use netforge_core::model::{ProjectDraft, ProjectId, TopologySpec};
use netforge_core::{LinkPolicy, TopologyStore};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    store: Arc<TopologyStore>,
    project: ProjectId,
}

impl Workspace {
    fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let config = StoreConfig {
            database_path: dir.path().join("netforge.db"),
            ..StoreConfig::default()
        };
        let store = Arc::new(TopologyStore::open(&config)?);
        let alice = store.create_user("alice", "hash")?;
        let project = store.create_project(alice.id, &ProjectDraft::new("Campus"))?.id;
        Ok(Self { dir, store, project })
    }

    fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    fn import(&self, policy: LinkPolicy, file: &PathBuf) -> Result<String> {
        let mut out = Vec::new();
        commands::import_topology(Arc::clone(&self.store), policy, "alice", self.project, file, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn export(&self) -> Result<TopologySpec> {
        let mut out = Vec::new();
        commands::export_topology(Arc::clone(&self.store), "alice", self.project, &mut out)?;
        Ok(serde_json::from_slice(&out)?)
    }
}

const CAMPUS: &str = r#"{
    "devices": [
        {"client_id": "core", "device_type": "router", "name": "core-1"},
        {"client_id": "acc", "device_type": "switch", "name": "access-1", "properties": {"vlan": 10}}
    ],
    "links": [
        {"source_client_id": "core", "target_client_id": "acc", "source_port": "ge-0/0/0"},
        {"source_client_id": "core", "target_client_id": "wan"}
    ]
}"#;

#[test]
fn test_import_reports_counts() -> Result<()> {
    let ws = Workspace::new()?;
    let file = ws.write("campus.json", CAMPUS)?;

    let output = ws.import(LinkPolicy::Lenient, &file)?;
    assert!(output.contains("2 devices, 1 links (1 dropped)"), "{output}");
    Ok(())
}

#[test]
fn test_export_can_be_reimported() -> Result<()> {
    let ws = Workspace::new()?;
    ws.import(LinkPolicy::Lenient, &ws.write("campus.json", CAMPUS)?)?;

    let exported = ws.export()?;
    assert_eq!(exported.devices.len(), 2);
    assert_eq!(exported.links.len(), 1);
    assert_eq!(exported.devices[1].properties["vlan"], 10);

    let file = ws.write("exported.json", &serde_json::to_string(&exported)?)?;
    let output = ws.import(LinkPolicy::Strict, &file)?;
    assert!(output.contains("2 devices, 1 links (0 dropped)"), "{output}");

    let again = ws.export()?;
    assert_eq!(again.devices.len(), 2);
    assert_eq!(again.links[0].source_port.as_deref(), Some("ge-0/0/0"));
    Ok(())
}

#[test]
fn test_strict_import_changes_nothing() -> Result<()> {
    let ws = Workspace::new()?;
    let file = ws.write("campus.json", CAMPUS)?;

    let result = ws.import(LinkPolicy::Strict, &file);
    assert!(result.is_err());
    assert!(ws.export()?.devices.is_empty());
    Ok(())
}

#[test]
fn test_unknown_user_and_project() -> Result<()> {
    let ws = Workspace::new()?;

    let mut out = Vec::new();
    assert!(commands::list_projects(&ws.store, "mallory", 0, 10, &mut out).is_err());

    let err = commands::export_topology(Arc::clone(&ws.store), "alice", ProjectId(999), &mut out)
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
    Ok(())
}

#[test]
fn test_migrate_and_list() -> Result<()> {
    let ws = Workspace::new()?;

    let mut out = Vec::new();
    commands::migrate(&ws.store, &mut out)?;
    assert_eq!(String::from_utf8(out)?, "schema version 1\n");

    let mut out = Vec::new();
    commands::list_projects(&ws.store, "alice", 0, 10, &mut out)?;
    let listing = String::from_utf8(out)?;
    assert!(listing.starts_with(&format!("{}\tCampus", ws.project)));
    Ok(())
}
