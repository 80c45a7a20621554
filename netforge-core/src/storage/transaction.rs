//! Row-level primitives executed inside an open SQLite transaction

use super::error::{StoreError, StoreResult};
use crate::model::{
    Device, DeviceId, DeviceSpec, Link, LinkId, Project, ProjectDraft, ProjectId, ProjectUpdate,
    Properties, Timestamp, User, UserId,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

const USER_COLUMNS: &str = "id, username, password_hash";
const PROJECT_COLUMNS: &str = "id, owner_id, name, description, last_modified";
const DEVICE_COLUMNS: &str = "id, project_id, device_type, name, properties";
const LINK_COLUMNS: &str =
    "id, project_id, source_device_id, target_device_id, source_port, target_port";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
    })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        last_modified: row.get(4)?,
    })
}

fn device_from_row(row: &Row<'_>) -> rusqlite::Result<Device> {
    let raw: String = row.get(4)?;
    let properties: Properties = serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Device {
        id: row.get(0)?,
        project_id: row.get(1)?,
        device_type: row.get(2)?,
        name: row.get(3)?,
        properties,
    })
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<Link> {
    Ok(Link {
        id: row.get(0)?,
        project_id: row.get(1)?,
        source_device_id: row.get(2)?,
        target_device_id: row.get(3)?,
        source_port: row.get(4)?,
        target_port: row.get(5)?,
    })
}

/// Handle to an open transaction.
///
/// Obtained from [`TopologyStore::with_transaction`](super::TopologyStore::with_transaction);
/// everything done through it commits or rolls back together.
pub struct StoreTransaction<'a> {
    conn: &'a Connection,
}

impl<'a> StoreTransaction<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ===== Users =====

    pub fn insert_user(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        self.conn
            .query_row(
                &format!(
                    "INSERT INTO users (username, password_hash) VALUES (?, ?) RETURNING {USER_COLUMNS}"
                ),
                params![username, password_hash],
                user_from_row,
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref err, _)
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    StoreError::UsernameTaken(username.to_string())
                }
                other => StoreError::Sqlite(other),
            })
    }

    pub fn find_user_by_name(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"),
                params![username],
                user_from_row,
            )
            .optional()?)
    }

    pub fn find_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                params![user_id],
                user_from_row,
            )
            .optional()?)
    }

    // ===== Projects =====

    pub fn insert_project(
        &self,
        owner_id: UserId,
        draft: &ProjectDraft,
        now: Timestamp,
    ) -> StoreResult<Project> {
        Ok(self.conn.query_row(
            &format!(
                "INSERT INTO projects (owner_id, name, description, last_modified)
                 VALUES (?, ?, ?, ?) RETURNING {PROJECT_COLUMNS}"
            ),
            params![owner_id, &draft.name, &draft.description, now],
            project_from_row,
        )?)
    }

    /// Look up a project only if `owner_id` owns it
    pub fn find_owned_project(
        &self,
        project_id: ProjectId,
        owner_id: UserId,
    ) -> StoreResult<Option<Project>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ? AND owner_id = ?"),
                params![project_id, owner_id],
                project_from_row,
            )
            .optional()?)
    }

    pub fn list_projects(&self, owner_id: UserId, skip: u32, limit: u32) -> StoreResult<Vec<Project>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE owner_id = ?
             ORDER BY id LIMIT ? OFFSET ?"
        ))?;

        let projects = stmt
            .query_map(params![owner_id, limit as i64, skip as i64], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn update_project(
        &self,
        project_id: ProjectId,
        update: &ProjectUpdate,
        now: Timestamp,
    ) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE projects
             SET name = COALESCE(?, name), description = COALESCE(?, description), last_modified = ?
             WHERE id = ?",
            params![&update.name, &update.description, now, project_id],
        )?;
        Ok(())
    }

    /// Delete a project; devices and links go with it through the foreign keys
    pub fn delete_project(&self, project_id: ProjectId) -> StoreResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM projects WHERE id = ?", params![project_id])?)
    }

    pub fn touch_project(&self, project_id: ProjectId, now: Timestamp) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE projects SET last_modified = ? WHERE id = ?",
            params![now, project_id],
        )?;
        Ok(())
    }

    // ===== Topology =====

    pub fn delete_links(&self, project_id: ProjectId) -> StoreResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM links WHERE project_id = ?", params![project_id])?)
    }

    pub fn delete_devices(&self, project_id: ProjectId) -> StoreResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM devices WHERE project_id = ?", params![project_id])?)
    }

    /// Insert a device and return its newly assigned id
    pub fn insert_device(&self, project_id: ProjectId, spec: &DeviceSpec) -> StoreResult<DeviceId> {
        let properties = serde_json::to_string(&spec.properties)?;
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO devices (project_id, device_type, name, properties)
             VALUES (?, ?, ?, ?) RETURNING id",
        )?;

        Ok(stmt.query_row(
            params![project_id, &spec.device_type, &spec.name, properties],
            |row| row.get(0),
        )?)
    }

    /// Insert a link between two devices of `project_id` and return its id
    pub fn insert_link(
        &self,
        project_id: ProjectId,
        source_device_id: DeviceId,
        target_device_id: DeviceId,
        source_port: Option<&str>,
        target_port: Option<&str>,
    ) -> StoreResult<LinkId> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO links (project_id, source_device_id, target_device_id, source_port, target_port)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )?;

        Ok(stmt.query_row(
            params![project_id, source_device_id, target_device_id, source_port, target_port],
            |row| row.get(0),
        )?)
    }

    /// Devices of a project in insertion order
    pub fn load_devices(&self, project_id: ProjectId) -> StoreResult<Vec<Device>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices WHERE project_id = ? ORDER BY id"
        ))?;

        let devices = stmt
            .query_map(params![project_id], device_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(devices)
    }

    /// Links of a project in insertion order
    pub fn load_links(&self, project_id: ProjectId) -> StoreResult<Vec<Link>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE project_id = ? ORDER BY id"
        ))?;

        let links = stmt
            .query_map(params![project_id], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }
}
