//! SQLite-backed store for users, projects and topologies
//!
//! Uses an r2d2 connection pool. Every connection is opened with foreign keys
//! enforced, which is what makes project deletion cascade to devices and links.

use super::error::{StoreError, StoreResult};
use super::migrations;
use super::transaction::StoreTransaction;
use crate::config::StoreConfig;
use crate::model::{Project, ProjectDraft, ProjectId, ProjectUpdate, Timestamp, User, UserId};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, TransactionBehavior};
use std::time::Duration;
use tracing::debug;

fn configure_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

/// Durable store for the whole service
pub struct TopologyStore {
    pool: Pool<SqliteConnectionManager>,
}

impl TopologyStore {
    /// Wrap an existing pool, applying pending migrations
    pub fn new(pool: Pool<SqliteConnectionManager>) -> StoreResult<Self> {
        migrations::migrate(&pool)?;
        Ok(Self { pool })
    }

    /// Open (or create) the database file described by `config`
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let busy_timeout = config.busy_timeout;
        let enable_wal = config.enable_wal;
        let manager = SqliteConnectionManager::file(&config.database_path).with_init(move |conn| {
            configure_connection(conn, busy_timeout)?;
            if enable_wal {
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
            }
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .build(manager)?;

        debug!(path = %config.database_path.display(), pool_size = config.pool_size, "opened topology store");
        Self::new(pool)
    }

    /// Single-connection in-memory store
    ///
    /// Pooled in-memory connections would each see their own database, so the
    /// pool is capped at one connection that is never recycled.
    pub fn memory() -> StoreResult<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| configure_connection(conn, Duration::from_secs(5)));
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?;

        Self::new(pool)
    }

    pub(crate) fn connection(&self) -> StoreResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Highest migration applied to this database
    pub fn schema_version(&self) -> StoreResult<i32> {
        let conn = self.connection()?;
        migrations::current_version(&conn)
    }

    /// Run `f` inside a transaction.
    ///
    /// Commits when `f` returns `Ok`; any error (including one raised by `f`
    /// itself) drops the transaction, which rolls it back.
    pub fn with_transaction<T, E, F>(&self, behavior: TransactionBehavior, f: F) -> Result<T, E>
    where
        F: FnOnce(&StoreTransaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.connection()?;
        let tx = conn
            .transaction_with_behavior(behavior)
            .map_err(StoreError::from)?;

        let value = f(&StoreTransaction::new(&tx))?;

        tx.commit().map_err(StoreError::from)?;
        Ok(value)
    }

    fn read<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&StoreTransaction<'_>) -> StoreResult<T>,
    {
        self.with_transaction(TransactionBehavior::Deferred, f)
    }

    fn write<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&StoreTransaction<'_>) -> StoreResult<T>,
    {
        self.with_transaction(TransactionBehavior::Immediate, f)
    }

    // ===== Users =====

    pub fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        self.write(|tx| tx.insert_user(username, password_hash))
    }

    pub fn find_user_by_name(&self, username: &str) -> StoreResult<Option<User>> {
        self.read(|tx| tx.find_user_by_name(username))
    }

    pub fn find_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        self.read(|tx| tx.find_user(user_id))
    }

    // ===== Projects =====

    pub fn create_project(&self, owner_id: UserId, draft: &ProjectDraft) -> StoreResult<Project> {
        self.write(|tx| tx.insert_project(owner_id, draft, Timestamp::now()))
    }

    pub fn list_projects(&self, owner_id: UserId, skip: u32, limit: u32) -> StoreResult<Vec<Project>> {
        self.read(|tx| tx.list_projects(owner_id, skip, limit))
    }

    pub fn get_project(&self, project_id: ProjectId, owner_id: UserId) -> StoreResult<Option<Project>> {
        self.read(|tx| tx.find_owned_project(project_id, owner_id))
    }

    /// Apply `update` if `owner_id` owns the project; `None` otherwise
    pub fn update_project(
        &self,
        project_id: ProjectId,
        owner_id: UserId,
        update: &ProjectUpdate,
    ) -> StoreResult<Option<Project>> {
        self.write(|tx| {
            if tx.find_owned_project(project_id, owner_id)?.is_none() {
                return Ok(None);
            }
            tx.update_project(project_id, update, Timestamp::now())?;
            tx.find_owned_project(project_id, owner_id)
        })
    }

    /// Delete the project if `owner_id` owns it, returning the row as it was
    pub fn delete_project(&self, project_id: ProjectId, owner_id: UserId) -> StoreResult<Option<Project>> {
        self.write(|tx| {
            let Some(project) = tx.find_owned_project(project_id, owner_id)? else {
                return Ok(None);
            };
            tx.delete_project(project.id)?;
            Ok(Some(project))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceSpec;

    fn store_with_user(name: &str) -> (TopologyStore, User) {
        let store = TopologyStore::memory().unwrap();
        let user = store.create_user(name, "hash").unwrap();
        (store, user)
    }

    #[test]
    fn test_create_and_find_user() {
        let (store, alice) = store_with_user("alice");

        assert_eq!(store.schema_version().unwrap(), migrations::CURRENT_SCHEMA_VERSION);

        let found = store.find_user_by_name("alice").unwrap().unwrap();
        assert_eq!(found, alice);
        assert_eq!(store.find_user(alice.id).unwrap().unwrap().username, "alice");
        assert!(store.find_user_by_name("bob").unwrap().is_none());
    }

    #[test]
    fn test_schema_version_after_open() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            database_path: dir.path().join("versioned.db"),
            ..StoreConfig::default()
        };

        let store = TopologyStore::open(&config).unwrap();
        assert_eq!(store.schema_version().unwrap(), migrations::latest_version());

        // Reopening applies nothing new
        drop(store);
        let store = TopologyStore::open(&config).unwrap();
        assert_eq!(store.schema_version().unwrap(), migrations::CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (store, _) = store_with_user("alice");

        let result = store.create_user("alice", "other");
        assert!(matches!(result, Err(StoreError::UsernameTaken(name)) if name == "alice"));
    }

    #[test]
    fn test_create_and_get_project() {
        let (store, alice) = store_with_user("alice");

        let project = store
            .create_project(alice.id, &ProjectDraft::new("Campus").with_description("core + access"))
            .unwrap();

        let retrieved = store.get_project(project.id, alice.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Campus");
        assert_eq!(retrieved.description.as_deref(), Some("core + access"));
        assert_eq!(retrieved.owner_id, alice.id);
    }

    #[test]
    fn test_project_invisible_to_other_owner() {
        let (store, alice) = store_with_user("alice");
        let bob = store.create_user("bob", "hash").unwrap();

        let project = store.create_project(alice.id, &ProjectDraft::new("Private")).unwrap();

        assert!(store.get_project(project.id, bob.id).unwrap().is_none());
        assert!(store
            .update_project(project.id, bob.id, &ProjectUpdate { name: Some("mine".into()), description: None })
            .unwrap()
            .is_none());
        assert!(store.delete_project(project.id, bob.id).unwrap().is_none());

        // Still intact for the owner
        let project = store.get_project(project.id, alice.id).unwrap().unwrap();
        assert_eq!(project.name, "Private");
    }

    #[test]
    fn test_list_projects_paginates_by_owner() {
        let (store, alice) = store_with_user("alice");
        let bob = store.create_user("bob", "hash").unwrap();

        for i in 0..5 {
            store.create_project(alice.id, &ProjectDraft::new(format!("p{i}"))).unwrap();
        }
        store.create_project(bob.id, &ProjectDraft::new("bob's")).unwrap();

        let all = store.list_projects(alice.id, 0, 100).unwrap();
        assert_eq!(all.len(), 5);

        let page: Vec<String> = store
            .list_projects(alice.id, 1, 2)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(page, vec!["p1", "p2"]);
    }

    #[test]
    fn test_update_project_is_partial_and_bumps_timestamp() {
        let (store, alice) = store_with_user("alice");
        let project = store
            .create_project(alice.id, &ProjectDraft::new("WAN").with_description("old"))
            .unwrap();

        let updated = store
            .update_project(
                project.id,
                alice.id,
                &ProjectUpdate { name: None, description: Some("new".into()) },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "WAN");
        assert_eq!(updated.description.as_deref(), Some("new"));
        assert!(updated.last_modified >= project.last_modified);
    }

    #[test]
    fn test_delete_project_cascades_topology() {
        let (store, alice) = store_with_user("alice");
        let project = store.create_project(alice.id, &ProjectDraft::new("Lab")).unwrap();

        store
            .with_transaction(TransactionBehavior::Immediate, |tx| -> StoreResult<()> {
                let a = tx.insert_device(project.id, &DeviceSpec::new("router", "r1"))?;
                let b = tx.insert_device(project.id, &DeviceSpec::new("switch", "s1"))?;
                tx.insert_link(project.id, a, b, Some("eth0"), None)?;
                Ok(())
            })
            .unwrap();

        let deleted = store.delete_project(project.id, alice.id).unwrap().unwrap();
        assert_eq!(deleted.id, project.id);
        assert!(store.get_project(project.id, alice.id).unwrap().is_none());

        let conn = store.connection().unwrap();
        let remaining: i64 = conn
            .query_row(
                "SELECT (SELECT COUNT(*) FROM devices) + (SELECT COUNT(*) FROM links)",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let (store, alice) = store_with_user("alice");
        let project = store.create_project(alice.id, &ProjectDraft::new("Lab")).unwrap();

        let result = store.with_transaction(TransactionBehavior::Immediate, |tx| -> StoreResult<()> {
            tx.insert_device(project.id, &DeviceSpec::new("router", "r1"))?;
            Err(StoreError::UsernameTaken("forced".into()))
        });
        assert!(result.is_err());

        let devices = store
            .with_transaction(TransactionBehavior::Deferred, |tx| tx.load_devices(project.id))
            .unwrap();
        assert!(devices.is_empty());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            database_path: dir.path().join("nested").join("netforge.db"),
            ..StoreConfig::default()
        };

        {
            let store = TopologyStore::open(&config).unwrap();
            store.create_user("alice", "hash").unwrap();
        }

        let store = TopologyStore::open(&config).unwrap();
        assert!(store.find_user_by_name("alice").unwrap().is_some());
    }
}
