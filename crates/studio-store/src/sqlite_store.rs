//! SQLite-backed storage for projects, pages configuration and edit sessions.
//!
//! Everything lives in a single `.studio/studio.db` file using WAL mode.
//! Timestamps are stored as Unix milliseconds so that the expiry sweep is a
//! plain integer comparison.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use studio_core::clock::{from_unix_millis, to_unix_millis};
use studio_core::{EditSession, ProjectId, SessionId};
use time::{Duration, OffsetDateTime};

use crate::project::{default_pages_config, Project, ProjectUpdate};
use crate::session_store::{ProjectRegistry, SessionStore};

const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    design_system TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS project_pages (
    project_id INTEGER PRIMARY KEY REFERENCES projects(id) ON DELETE CASCADE,
    pages_json TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS edit_sessions (
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    session_id TEXT NOT NULL,
    editor_name TEXT NOT NULL DEFAULT '',
    started_at INTEGER NOT NULL,
    last_heartbeat INTEGER NOT NULL,
    PRIMARY KEY (project_id, session_id)
);

CREATE INDEX IF NOT EXISTS idx_edit_sessions_heartbeat ON edit_sessions(last_heartbeat);
CREATE INDEX IF NOT EXISTS idx_projects_updated ON projects(updated_at DESC);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// SQLite-backed storage engine.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open an existing studio.db.
    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        if !db_path.exists() {
            anyhow::bail!(
                "database {} not found (run `studio init` first)",
                db_path.display()
            );
        }
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.apply_pragmas()?;
        Ok(store)
    }

    /// Open or create studio.db with full schema.
    pub fn open_or_create(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.apply_pragmas()?;
        store.apply_schema()?;
        Ok(store)
    }

    fn apply_pragmas(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    fn apply_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;
        Ok(())
    }

    pub fn schema_version(&self) -> anyhow::Result<u32> {
        let version_str: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM schema_meta WHERE key = 'version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version_str.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    // ── Projects ────────────────────────────────────────────────────

    /// Insert a project and seed its default pages configuration.
    pub fn create_project(&self, name: &str, description: &str) -> anyhow::Result<ProjectId> {
        let now = to_unix_millis(OffsetDateTime::now_utc());
        let pages = serde_json::to_string(&default_pages_config(name))?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO projects (name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![name, description, now],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO project_pages (project_id, pages_json, updated_at) VALUES (?1, ?2, ?3)",
            params![id, pages, now],
        )?;
        tx.commit()?;
        Ok(id)
    }

    pub fn get_project(&self, id: ProjectId) -> anyhow::Result<Option<Project>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, description, design_system, created_at, updated_at
                 FROM projects WHERE id = ?1",
                params![id],
                map_project_row,
            )
            .optional()?;
        row.map(row_to_project).transpose()
    }

    /// All projects, most recently updated first.
    pub fn list_projects(&self) -> anyhow::Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, design_system, created_at, updated_at
             FROM projects ORDER BY updated_at DESC, id DESC",
        )?;
        let rows = stmt
            .query_map([], map_project_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(row_to_project).collect()
    }

    /// Apply a partial update. Returns `false` if the project does not exist.
    pub fn update_project(&self, id: ProjectId, update: &ProjectUpdate) -> anyhow::Result<bool> {
        let Some(current) = self.get_project(id)? else {
            return Ok(false);
        };
        let name = update.name.as_deref().unwrap_or(&current.name);
        let description = update
            .description
            .as_deref()
            .unwrap_or(&current.description);
        let design_system = match &update.design_system {
            Some(next) => next.as_ref(),
            None => current.design_system.as_ref(),
        }
        .map(serde_json::to_string)
        .transpose()?;
        let now = to_unix_millis(OffsetDateTime::now_utc());
        self.conn.execute(
            "UPDATE projects SET name = ?1, description = ?2, design_system = ?3, updated_at = ?4
             WHERE id = ?5",
            params![name, description, design_system, now, id],
        )?;
        Ok(true)
    }

    /// Delete a project together with its pages and edit sessions.
    pub fn delete_project(&self, id: ProjectId) -> anyhow::Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// Stored pages configuration, or the default for an unsaved project.
    /// `None` when the project does not exist.
    pub fn pages_config(&self, id: ProjectId) -> anyhow::Result<Option<serde_json::Value>> {
        let Some(project) = self.get_project(id)? else {
            return Ok(None);
        };
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT pages_json FROM project_pages WHERE project_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let parsed = stored.and_then(|s| serde_json::from_str(&s).ok());
        Ok(Some(
            parsed.unwrap_or_else(|| default_pages_config(&project.name)),
        ))
    }

    pub fn save_pages_config(
        &self,
        id: ProjectId,
        pages: &serde_json::Value,
    ) -> anyhow::Result<()> {
        let json = serde_json::to_string(pages)?;
        let now = to_unix_millis(OffsetDateTime::now_utc());
        self.conn.execute(
            "INSERT INTO project_pages (project_id, pages_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(project_id) DO UPDATE SET pages_json = excluded.pages_json,
                                                   updated_at = excluded.updated_at",
            params![id, json, now],
        )?;
        Ok(())
    }

    /// Every stored session row, including ones not yet swept.
    pub fn all_sessions(&self) -> anyhow::Result<Vec<EditSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT project_id, session_id, editor_name, started_at, last_heartbeat
             FROM edit_sessions ORDER BY project_id, last_heartbeat DESC",
        )?;
        let rows = stmt
            .query_map([], map_session_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(row_to_session).collect()
    }
}

impl SessionStore for SqliteStore {
    /// Deletes rows whose last heartbeat is more than `timeout` before `now`.
    ///
    /// `last_heartbeat < now - timeout` is the SQL form of
    /// `studio_core::is_expired`; the two must agree at the boundary, where a
    /// session exactly `timeout` old is still live.
    fn purge_expired(&self, now: OffsetDateTime, timeout: Duration) -> anyhow::Result<usize> {
        let cutoff = to_unix_millis(now - timeout);
        let removed = self.conn.execute(
            "DELETE FROM edit_sessions WHERE last_heartbeat < ?1",
            params![cutoff],
        )?;
        if removed > 0 {
            tracing::debug!(removed, "purged expired edit sessions");
        }
        Ok(removed)
    }

    fn get_active(
        &self,
        project_id: ProjectId,
        now: OffsetDateTime,
        timeout: Duration,
    ) -> anyhow::Result<Option<EditSession>> {
        self.purge_expired(now, timeout)?;
        let row = self
            .conn
            .query_row(
                "SELECT project_id, session_id, editor_name, started_at, last_heartbeat
                 FROM edit_sessions WHERE project_id = ?1
                 ORDER BY last_heartbeat DESC LIMIT 1",
                params![project_id],
                map_session_row,
            )
            .optional()?;
        row.map(row_to_session).transpose()
    }

    fn upsert_own(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<()> {
        let now_ms = to_unix_millis(now);
        let tx = self.conn.unchecked_transaction()?;
        let renewed = tx.execute(
            "UPDATE edit_sessions SET editor_name = ?3, last_heartbeat = ?4
             WHERE project_id = ?1 AND session_id = ?2",
            params![project_id, session_id.as_str(), editor_name, now_ms],
        )?;
        if renewed == 0 {
            tx.execute(
                "DELETE FROM edit_sessions WHERE project_id = ?1",
                params![project_id],
            )?;
            tx.execute(
                "INSERT INTO edit_sessions
                 (project_id, session_id, editor_name, started_at, last_heartbeat)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![project_id, session_id.as_str(), editor_name, now_ms],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn heartbeat(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let n = self.conn.execute(
            "UPDATE edit_sessions SET last_heartbeat = ?3
             WHERE project_id = ?1 AND session_id = ?2",
            params![project_id, session_id.as_str(), to_unix_millis(now)],
        )?;
        Ok(n > 0)
    }

    fn release(&self, project_id: ProjectId, session_id: &SessionId) -> anyhow::Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM edit_sessions WHERE project_id = ?1 AND session_id = ?2",
            params![project_id, session_id.as_str()],
        )?;
        Ok(n > 0)
    }

    fn force_replace(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<()> {
        let now_ms = to_unix_millis(now);
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM edit_sessions WHERE project_id = ?1",
            params![project_id],
        )?;
        tx.execute(
            "INSERT INTO edit_sessions
             (project_id, session_id, editor_name, started_at, last_heartbeat)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![project_id, session_id.as_str(), editor_name, now_ms],
        )?;
        tx.commit()?;
        Ok(())
    }
}

impl ProjectRegistry for SqliteStore {
    fn project_exists(&self, project_id: ProjectId) -> anyhow::Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM projects WHERE id = ?1",
                params![project_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        // Merge WAL back into main DB so users see a single file when idle.
        let _ = self
            .conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);");
    }
}

// ── Row helpers ─────────────────────────────────────────────────────

struct SessionRow {
    project_id: i64,
    session_id: String,
    editor_name: String,
    started_at: i64,
    last_heartbeat: i64,
}

fn map_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        project_id: row.get(0)?,
        session_id: row.get(1)?,
        editor_name: row.get(2)?,
        started_at: row.get(3)?,
        last_heartbeat: row.get(4)?,
    })
}

fn row_to_session(row: SessionRow) -> anyhow::Result<EditSession> {
    Ok(EditSession {
        project_id: row.project_id,
        session_id: SessionId::new(row.session_id),
        editor_name: row.editor_name,
        started_at: from_unix_millis(row.started_at)?,
        last_heartbeat: from_unix_millis(row.last_heartbeat)?,
    })
}

struct ProjectRow {
    id: i64,
    name: String,
    description: String,
    design_system: Option<String>,
    created_at: i64,
    updated_at: i64,
}

fn map_project_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRow> {
    Ok(ProjectRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        design_system: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_project(row: ProjectRow) -> anyhow::Result<Project> {
    // A corrupt design_system blob reads as unset rather than failing the listing.
    let design_system = row
        .design_system
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok());
    Ok(Project {
        id: row.id,
        name: row.name,
        description: row.description,
        design_system,
        created_at: from_unix_millis(row.created_at)?,
        updated_at: from_unix_millis(row.updated_at)?,
    })
}
