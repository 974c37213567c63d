//! Catalog store
//!
//! Persistence for statuses, skills, projects and project-skill links.

mod schema;

pub use schema::*;

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        // The bundled SQLite enforces foreign keys by default; project
        // deletion must leave its skill links in place.
        conn.pragma_update(None, "foreign_keys", false)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.ensure_schema()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave a half-applied statement
        // behind, so a poisoned guard is still usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create the four catalog tables if they are missing
    pub fn ensure_schema(&self) -> DbResult<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert the fixed statuses and skills; existing names are left alone
    pub fn seed_defaults(&self) -> DbResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO status (status_name) VALUES (?1)")?;
            for name in DEFAULT_STATUSES {
                stmt.execute(params![name])?;
            }
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO skills (skill_name) VALUES (?1)")?;
            for name in DEFAULT_SKILLS {
                stmt.execute(params![name])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ==================== Project Mutations ====================

    /// Insert a project. A duplicate `(owner_id, name)` is silently ignored,
    /// so callers read the row back instead of assuming the insert happened.
    pub fn create_project(
        &self,
        owner_id: OwnerId,
        name: &str,
        url: Option<&str>,
        status_id: Option<i64>,
    ) -> DbResult<()> {
        let inserted = self.conn().execute(
            "INSERT OR IGNORE INTO projects (user_id, project_name, url, status_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![owner_id, name, url, status_id],
        )?;
        if inserted == 0 {
            tracing::debug!(owner_id, project = %name, "Project already exists, insert ignored");
        }
        Ok(())
    }

    /// Change one column of the project identified by `(project_name, owner_id)`
    pub fn update_project_field(
        &self,
        update: &ProjectUpdate,
        project_name: &str,
        owner_id: OwnerId,
    ) -> DbResult<()> {
        let updated = self.conn().execute(
            update.statement(),
            params![update.value(), project_name, owner_id],
        )?;
        if updated == 0 {
            return Err(DbError::NotFound(format!("project {project_name}")));
        }
        Ok(())
    }

    /// Delete a project row. Skill links are not touched.
    pub fn delete_project(&self, owner_id: OwnerId, project_id: i64) -> DbResult<()> {
        let deleted = self.conn().execute(
            "DELETE FROM projects WHERE user_id = ?1 AND project_id = ?2",
            params![owner_id, project_id],
        )?;
        if deleted == 0 {
            return Err(DbError::NotFound(format!("project #{project_id}")));
        }
        Ok(())
    }

    /// Link a skill to a project by name; linking twice is a no-op
    pub fn add_skill_to_project(
        &self,
        owner_id: OwnerId,
        project_name: &str,
        skill_name: &str,
    ) -> DbResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let project_id: i64 = tx
            .query_row(
                "SELECT project_id FROM projects WHERE project_name = ?1 AND user_id = ?2",
                params![project_name, owner_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("project {project_name}")))?;

        let skill_id: i64 = tx
            .query_row(
                "SELECT skill_id FROM skills WHERE skill_name = ?1",
                params![skill_name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("skill {skill_name}")))?;

        tx.execute(
            "INSERT OR IGNORE INTO project_skills (project_id, skill_id) VALUES (?1, ?2)",
            params![project_id, skill_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    #[allow(dead_code)] // API completeness
    pub fn remove_skill_from_project(&self, project_id: i64, skill_id: i64) -> DbResult<()> {
        self.conn().execute(
            "DELETE FROM project_skills WHERE project_id = ?1 AND skill_id = ?2",
            params![project_id, skill_id],
        )?;
        Ok(())
    }

    // ==================== Reference Data ====================

    /// All statuses in seed order
    pub fn list_statuses(&self) -> DbResult<Vec<Status>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT status_id, status_name FROM status ORDER BY status_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Status {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    pub fn list_skills(&self) -> DbResult<Vec<Skill>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT skill_id, skill_name FROM skills ORDER BY skill_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Skill {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    pub fn resolve_status_id(&self, name: &str) -> DbResult<i64> {
        self.conn()
            .query_row(
                "SELECT status_id FROM status WHERE status_name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("status {name}")))
    }

    #[allow(dead_code)] // API completeness
    pub fn rename_status(&self, old: &str, new: &str) -> DbResult<()> {
        let updated = self.conn().execute(
            "UPDATE status SET status_name = ?1 WHERE status_name = ?2",
            params![new, old],
        )?;
        if updated == 0 {
            return Err(DbError::NotFound(format!("status {old}")));
        }
        Ok(())
    }

    #[allow(dead_code)] // API completeness
    pub fn rename_skill(&self, old: &str, new: &str) -> DbResult<()> {
        let updated = self.conn().execute(
            "UPDATE skills SET skill_name = ?1 WHERE skill_name = ?2",
            params![new, old],
        )?;
        if updated == 0 {
            return Err(DbError::NotFound(format!("skill {old}")));
        }
        Ok(())
    }

    // ==================== Project Queries ====================

    /// Projects of one owner, oldest first
    pub fn list_projects(&self, owner_id: OwnerId) -> DbResult<Vec<Project>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT project_id, user_id, project_name, description, url, status_id, photo
             FROM projects WHERE user_id = ?1 ORDER BY project_id",
        )?;
        let rows = stmt.query_map(params![owner_id], |row| {
            Ok(Project {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
                url: row.get(4)?,
                status_id: row.get(5)?,
                photo: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    pub fn resolve_project_id(&self, name: &str, owner_id: OwnerId) -> DbResult<i64> {
        self.conn()
            .query_row(
                "SELECT project_id FROM projects WHERE project_name = ?1 AND user_id = ?2",
                params![name, owner_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("project {name}")))
    }

    /// Name of an owner's project by id
    pub fn project_name(&self, owner_id: OwnerId, project_id: i64) -> DbResult<Option<String>> {
        self.conn()
            .query_row(
                "SELECT project_name FROM projects WHERE project_id = ?1 AND user_id = ?2",
                params![project_id, owner_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(DbError::from)
    }

    /// Skill names linked to a project, joined with ", "; empty when none
    pub fn skills_for_project(&self, owner_id: OwnerId, name: &str) -> DbResult<String> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT s.skill_name
             FROM project_skills ps
             JOIN skills s ON ps.skill_id = s.skill_id
             JOIN projects p ON ps.project_id = p.project_id
             WHERE p.project_name = ?1 AND p.user_id = ?2
             ORDER BY s.skill_id",
        )?;
        let names = stmt
            .query_map(params![name, owner_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names.join(", "))
    }

    pub fn photo_for_project(&self, name: &str, owner_id: OwnerId) -> DbResult<Option<String>> {
        let photo: Option<Option<String>> = self
            .conn()
            .query_row(
                "SELECT photo FROM projects WHERE project_name = ?1 AND user_id = ?2",
                params![name, owner_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(photo.flatten().filter(|p| !p.is_empty()))
    }

    pub fn project_summary(
        &self,
        owner_id: OwnerId,
        name: &str,
    ) -> DbResult<Option<ProjectSummary>> {
        self.conn()
            .query_row(
                "SELECT p.project_name, p.description, p.url, s.status_name
                 FROM projects p
                 LEFT JOIN status s ON p.status_id = s.status_id
                 WHERE p.user_id = ?1 AND p.project_name = ?2",
                params![owner_id, name],
                |row| {
                    Ok(ProjectSummary {
                        name: row.get(0)?,
                        description: row.get(1)?,
                        url: row.get(2)?,
                        status_name: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(DbError::from)
    }

    /// Total number of project-skill links, including orphaned ones
    #[allow(dead_code)] // Used in tests
    pub fn count_project_skill_links(&self) -> DbResult<i64> {
        self.conn()
            .query_row("SELECT COUNT(*) FROM project_skills", [], |row| row.get(0))
            .map_err(DbError::from)
    }
}
