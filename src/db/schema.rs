//! Database schema and record types

use serde::{Deserialize, Serialize};

/// SQL schema for initialization
///
/// Foreign keys are declared but not enforced (`Database` switches
/// `PRAGMA foreign_keys` off), so deleting a project leaves its
/// `project_skills` rows behind.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS status (
    status_id   INTEGER PRIMARY KEY,
    status_name TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS skills (
    skill_id   INTEGER PRIMARY KEY,
    skill_name TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS projects (
    project_id   INTEGER PRIMARY KEY,
    user_id      INTEGER NOT NULL,
    project_name TEXT NOT NULL,
    description  TEXT,
    url          TEXT,
    status_id    INTEGER,
    photo        TEXT,
    UNIQUE (user_id, project_name),
    FOREIGN KEY (status_id) REFERENCES status(status_id)
);

CREATE INDEX IF NOT EXISTS idx_projects_owner ON projects(user_id);

CREATE TABLE IF NOT EXISTS project_skills (
    project_id INTEGER,
    skill_id   INTEGER,
    UNIQUE (project_id, skill_id),
    FOREIGN KEY (project_id) REFERENCES projects(project_id),
    FOREIGN KEY (skill_id)   REFERENCES skills(skill_id)
);
";

/// Lifecycle labels, in display order
pub const DEFAULT_STATUSES: &[&str] = &[
    "На этапе проектирования",
    "В процессе разработки",
    "Разработан. Готов к использованию.",
    "Обновлен",
    "Завершен. Не поддерживается",
];

pub const DEFAULT_SKILLS: &[&str] = &["Python", "SQL", "API", "Telegram"];

/// External user identifier that scopes project visibility
pub type OwnerId = i64;

/// Status reference row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: i64,
    pub name: String,
}

/// Skill reference row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
}

/// Project record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub owner_id: OwnerId,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub status_id: Option<i64>,
    pub photo: Option<String>,
}

/// Project joined with its status label, as shown on the project card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub status_name: Option<String>,
}

/// A single-column change to a project.
///
/// Each variant owns exactly one column; the SQL for every variant is fixed
/// at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ProjectUpdate {
    Name(String),
    Description(String),
    Url(String),
    StatusId(i64),
    Photo(String),
}

impl ProjectUpdate {
    pub(super) fn statement(&self) -> &'static str {
        match self {
            ProjectUpdate::Name(_) => {
                "UPDATE projects SET project_name = ?1 WHERE project_name = ?2 AND user_id = ?3"
            }
            ProjectUpdate::Description(_) => {
                "UPDATE projects SET description = ?1 WHERE project_name = ?2 AND user_id = ?3"
            }
            ProjectUpdate::Url(_) => {
                "UPDATE projects SET url = ?1 WHERE project_name = ?2 AND user_id = ?3"
            }
            ProjectUpdate::StatusId(_) => {
                "UPDATE projects SET status_id = ?1 WHERE project_name = ?2 AND user_id = ?3"
            }
            ProjectUpdate::Photo(_) => {
                "UPDATE projects SET photo = ?1 WHERE project_name = ?2 AND user_id = ?3"
            }
        }
    }

    pub(super) fn value(&self) -> rusqlite::types::Value {
        use rusqlite::types::Value;
        match self {
            ProjectUpdate::Name(s)
            | ProjectUpdate::Description(s)
            | ProjectUpdate::Url(s)
            | ProjectUpdate::Photo(s) => Value::Text(s.clone()),
            ProjectUpdate::StatusId(id) => Value::Integer(*id),
        }
    }
}
