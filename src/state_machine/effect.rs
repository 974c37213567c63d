//! Effects produced by state transitions

use super::state::EditableField;
use crate::presentation::Reply;

/// Effects to be executed after a state transition, in order.
///
/// Store mutations always precede the confirmation reply, so a failed
/// mutation suppresses the confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a message to the user
    Reply(Reply),

    /// Render the project card (and photo, if any)
    ShowProject { project: String },

    /// Render the owner's project list with its inline menu
    ListProjects,

    /// Insert a project; the status is given by label
    CreateProject {
        name: String,
        url: String,
        status: String,
    },

    /// Link a skill to a project
    AddSkill { project: String, skill: String },

    /// Delete a project
    DeleteProject { project: String },

    /// Change one field; a status value is a label, translated on execution
    UpdateProject {
        project: String,
        field: EditableField,
        value: String,
    },

    /// Download the photo, store it and record its file name
    SavePhoto { project: String, file_id: String },
}

impl Effect {
    /// Whether this effect writes to the catalog or photo library
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Effect::CreateProject { .. }
                | Effect::AddSkill { .. }
                | Effect::DeleteProject { .. }
                | Effect::UpdateProject { .. }
                | Effect::SavePhoto { .. }
        )
    }
}
