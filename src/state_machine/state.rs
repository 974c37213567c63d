//! Dialog state types

use crate::db::OwnerId;
use serde::{Deserialize, Serialize};

// ============================================================================
// Editable Fields
// ============================================================================

/// Project fields offered by the update dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditableField {
    Name,
    Description,
    Url,
    Status,
}

impl EditableField {
    /// Menu order
    pub const ALL: [EditableField; 4] = [
        EditableField::Name,
        EditableField::Description,
        EditableField::Url,
        EditableField::Status,
    ];

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            EditableField::Name => "Имя проекта",
            EditableField::Description => "Описание",
            EditableField::Url => "Ссылка",
            EditableField::Status => "Статус",
        }
    }

    /// Prompt for the new value
    pub fn prompt(self) -> &'static str {
        match self {
            EditableField::Name => "Введите новое имя проекта:",
            EditableField::Description => "Введите новое описание:",
            EditableField::Url => "Введите новую ссылку:",
            EditableField::Status => "Выберите новый статус:",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.label() == label)
    }

    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|f| f.label().to_string()).collect()
    }
}

// ============================================================================
// Dialog State
// ============================================================================

/// Where a user is inside a multi-step dialog.
///
/// Each variant is one step; it carries every value collected by the earlier
/// steps plus the option lists captured when the dialog started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogState {
    /// No dialog in progress
    #[default]
    Idle,

    // /new_project
    NewProjectName {
        /// Names the owner already uses
        existing: Vec<String>,
    },
    NewProjectUrl {
        name: String,
    },
    NewProjectStatus {
        name: String,
        url: String,
    },

    // /skills
    AddSkillProject {
        projects: Vec<String>,
    },
    AddSkillSkill {
        project: String,
        skills: Vec<String>,
    },

    // /delete
    DeleteProject {
        projects: Vec<String>,
    },

    // /update_projects
    UpdateProject {
        projects: Vec<String>,
    },
    UpdateField {
        project: String,
        projects: Vec<String>,
    },
    UpdateValue {
        project: String,
        field: EditableField,
        projects: Vec<String>,
    },

    // /add_description
    DescriptionProject {
        projects: Vec<String>,
    },
    DescriptionText {
        project: String,
    },

    // /add_photo
    PhotoProject {
        projects: Vec<String>,
    },
    PhotoAwaiting {
        project: String,
    },
}

impl DialogState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DialogState::Idle)
    }

    /// Short step name for logs
    pub fn name(&self) -> &'static str {
        match self {
            DialogState::Idle => "idle",
            DialogState::NewProjectName { .. } => "new_project_name",
            DialogState::NewProjectUrl { .. } => "new_project_url",
            DialogState::NewProjectStatus { .. } => "new_project_status",
            DialogState::AddSkillProject { .. } => "add_skill_project",
            DialogState::AddSkillSkill { .. } => "add_skill_skill",
            DialogState::DeleteProject { .. } => "delete_project",
            DialogState::UpdateProject { .. } => "update_project",
            DialogState::UpdateField { .. } => "update_field",
            DialogState::UpdateValue { .. } => "update_value",
            DialogState::DescriptionProject { .. } => "description_project",
            DialogState::DescriptionText { .. } => "description_text",
            DialogState::PhotoProject { .. } => "photo_project",
            DialogState::PhotoAwaiting { .. } => "photo_awaiting",
        }
    }
}

/// Reference data read from the catalog right before a transition
#[derive(Debug, Clone, Default)]
pub struct DialogContext {
    pub owner_id: OwnerId,
    pub statuses: Vec<String>,
    pub skills: Vec<String>,
    /// The owner's project names
    pub projects: Vec<String>,
}
