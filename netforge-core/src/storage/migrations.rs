//! Versioned schema migrations
//!
//! Each migration runs in its own transaction and is recorded in
//! `schema_version`, so re-running `migrate` is a no-op.

use super::error::StoreResult;
use crate::model::Timestamp;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Migration descriptor
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub up_sql: &'static str,
}

/// All available migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Users, projects, devices and links",
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                last_modified INTEGER NOT NULL,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_projects_owner ON projects(owner_id);

            -- (id, project_id) is unique so links can pin both endpoints to their own project
            CREATE TABLE IF NOT EXISTS devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                device_type TEXT NOT NULL,
                name TEXT NOT NULL,
                properties TEXT NOT NULL DEFAULT '{}',
                UNIQUE (id, project_id),
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_devices_project ON devices(project_id);

            CREATE TABLE IF NOT EXISTS links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                source_device_id INTEGER NOT NULL,
                target_device_id INTEGER NOT NULL,
                source_port TEXT,
                target_port TEXT,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE,
                FOREIGN KEY (source_device_id, project_id)
                    REFERENCES devices(id, project_id) ON DELETE CASCADE,
                FOREIGN KEY (target_device_id, project_id)
                    REFERENCES devices(id, project_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_links_project ON links(project_id);
            CREATE INDEX IF NOT EXISTS idx_links_source ON links(source_device_id, project_id);
            CREATE INDEX IF NOT EXISTS idx_links_target ON links(target_device_id, project_id);
        "#,
    }]
}

fn ensure_version_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Get current schema version from database
pub fn current_version(conn: &Connection) -> StoreResult<i32> {
    ensure_version_table(conn)?;

    let version = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(version.unwrap_or(0))
}

/// Run all pending migrations, returning how many were applied
pub fn migrate(pool: &Pool<SqliteConnectionManager>) -> StoreResult<usize> {
    let mut conn = pool.get()?;
    let current = current_version(&conn)?;

    let pending: Vec<_> = get_migrations()
        .into_iter()
        .filter(|m| m.version > current)
        .collect();

    let applied = pending.len();
    for migration in pending {
        let tx = conn.transaction()?;
        tx.execute_batch(migration.up_sql)?;
        tx.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?, ?)",
            params![migration.version, Timestamp::now()],
        )?;
        tx.commit()?;

        info!(
            version = migration.version,
            description = migration.description,
            "applied schema migration"
        );
    }

    Ok(applied)
}

/// Get the latest migration version available
pub fn latest_version() -> i32 {
    get_migrations().iter().map(|m| m.version).max().unwrap_or(0)
}
