//! Conversation engine executor

use super::photos::PhotoLibrary;
use super::traits::{ChatId, Transport, TransportError};
use super::{DialogSession, Payload, Update};

use crate::db::{Database, DbError, OwnerId, ProjectUpdate};
use crate::presentation::{
    project_card, project_list, Keyboard, Reply, NO_PROJECTS, PHOTO_NOT_RECEIVED,
    PROJECT_NOT_FOUND, STORE_FAILURE,
};
use crate::state_machine::{transition, DialogContext, DialogState, EditableField, Effect, Event};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Failure while executing an effect
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] DbError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Photo storage error: {0}")]
    Photo(#[from] std::io::Error),
    /// The inbound photo could not be fetched; the chat itself still works
    #[error("Photo download failed: {0}")]
    Download(TransportError),
}

/// Drives every user's dialog over one catalog, photo library and transport
pub struct ConversationEngine<T: Transport> {
    db: Database,
    photos: PhotoLibrary,
    transport: T,
    sessions: RwLock<HashMap<OwnerId, DialogSession>>,
    /// Idle time after which an unfinished dialog is dropped
    ttl: Duration,
}

impl<T: Transport> ConversationEngine<T> {
    pub fn new(db: Database, photos: PhotoLibrary, transport: T, ttl: Duration) -> Self {
        Self {
            db,
            photos,
            transport,
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current dialog step of a user
    pub async fn dialog_state(&self, owner_id: OwnerId) -> DialogState {
        self.sessions
            .read()
            .await
            .get(&owner_id)
            .map(|s| s.state.clone())
            .unwrap_or_default()
    }

    /// Number of dialogs in progress
    pub async fn active_dialogs(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Process one inbound update.
    ///
    /// Store failures are reported to the user and swallowed; only transport
    /// failures reach the caller.
    pub async fn handle(&self, update: Update) -> Result<(), TransportError> {
        let Update {
            chat_id,
            owner_id,
            payload,
        } = update;

        let event = match payload {
            Payload::Text(text) => Event::from_text(text),
            Payload::Photo { file_id } => Event::Photo { file_id },
            Payload::Other => Event::Other,
            Payload::Selection { callback_id, data } => {
                if let Err(e) = self.transport.answer_callback(&callback_id).await {
                    tracing::warn!(owner_id, error = %e, "Failed to acknowledge button press");
                }
                match self.selected_project(owner_id, &data) {
                    Ok(Some(project)) => Event::Selection { project },
                    Ok(None) => {
                        tracing::info!(owner_id, %data, "Button refers to a missing project");
                        let reply = Reply::text(PROJECT_NOT_FOUND);
                        return self.transport.send_text(chat_id, &reply).await;
                    }
                    Err(e) => {
                        tracing::error!(owner_id, error = %e, "Failed to resolve button");
                        let reply = Reply::text(STORE_FAILURE);
                        return self.transport.send_text(chat_id, &reply).await;
                    }
                }
            }
        };

        let ctx = match self.load_context(owner_id) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::error!(owner_id, error = %e, "Failed to read reference data");
                return self.transport.send_text(chat_id, &Reply::text(STORE_FAILURE)).await;
            }
        };

        let result = {
            let mut sessions = self.sessions.write().await;
            let state = sessions
                .get(&owner_id)
                .map(|s| s.state.clone())
                .unwrap_or_default();
            let result = transition(&state, &ctx, event);
            tracing::debug!(
                owner_id = ctx.owner_id,
                from = state.name(),
                to = result.new_state.name(),
                effects = result.effects.len(),
                "Dialog transition"
            );
            if result.new_state.is_idle() {
                sessions.remove(&owner_id);
            } else {
                sessions.insert(
                    owner_id,
                    DialogSession::new(result.new_state.clone(), Utc::now()),
                );
            }
            result
        };

        for effect in result.effects {
            if let Err(e) = self.execute_effect(chat_id, owner_id, effect).await {
                // Remaining effects are confirmations of the failed step
                return self.report_failure(chat_id, owner_id, e).await;
            }
        }
        Ok(())
    }

    /// Drop dialogs untouched for longer than the TTL; returns how many went
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|owner_id, session| {
            let keep = now - session.touched_at <= self.ttl;
            if !keep {
                tracing::debug!(owner_id, step = session.state.name(), "Dialog expired");
            }
            keep
        });
        before - sessions.len()
    }

    /// Rename a project and move its photo along, so a later project reusing
    /// the old name cannot overwrite it
    async fn rename_project(
        &self,
        owner_id: OwnerId,
        project: &str,
        new_name: String,
    ) -> Result<(), EngineError> {
        let photo = self.db.photo_for_project(project, owner_id)?;
        self.db
            .update_project_field(&ProjectUpdate::Name(new_name.clone()), project, owner_id)?;
        tracing::info!(owner_id, project = %project, new_name = %new_name, "Project renamed");

        let Some(old_file) = photo else {
            return Ok(());
        };
        let new_file = PhotoLibrary::file_name(owner_id, &new_name);
        if old_file == new_file || !self.photos.exists(&old_file).await {
            return Ok(());
        }
        self.photos.rename(&old_file, &new_file).await?;
        self.db
            .update_project_field(&ProjectUpdate::Photo(new_file), &new_name, owner_id)?;
        Ok(())
    }

    /// Project named by an inline button's callback data
    fn selected_project(&self, owner_id: OwnerId, data: &str) -> Result<Option<String>, DbError> {
        match data.parse::<i64>() {
            Ok(project_id) => self.db.project_name(owner_id, project_id),
            Err(_) => Ok(None),
        }
    }

    fn load_context(&self, owner_id: OwnerId) -> Result<DialogContext, DbError> {
        Ok(DialogContext {
            owner_id,
            statuses: self.db.list_statuses()?.into_iter().map(|s| s.name).collect(),
            skills: self.db.list_skills()?.into_iter().map(|s| s.name).collect(),
            projects: self
                .db
                .list_projects(owner_id)?
                .into_iter()
                .map(|p| p.name)
                .collect(),
        })
    }

    async fn report_failure(
        &self,
        chat_id: ChatId,
        owner_id: OwnerId,
        error: EngineError,
    ) -> Result<(), TransportError> {
        let reply = match error {
            EngineError::Transport(e) => return Err(e),
            EngineError::Store(DbError::NotFound(what)) => {
                tracing::info!(owner_id, %what, "Dialog target disappeared");
                Reply::text(PROJECT_NOT_FOUND).with_keyboard(Keyboard::Remove)
            }
            EngineError::Download(e) => {
                tracing::warn!(owner_id, error = %e, "Failed to download photo");
                Reply::text(PHOTO_NOT_RECEIVED).with_keyboard(Keyboard::Remove)
            }
            e @ (EngineError::Store(_) | EngineError::Photo(_)) => {
                tracing::error!(owner_id, error = %e, "Failed to execute effect");
                Reply::text(STORE_FAILURE).with_keyboard(Keyboard::Remove)
            }
        };
        self.transport.send_text(chat_id, &reply).await
    }

    async fn execute_effect(
        &self,
        chat_id: ChatId,
        owner_id: OwnerId,
        effect: Effect,
    ) -> Result<(), EngineError> {
        match effect {
            Effect::Reply(reply) => {
                self.transport.send_text(chat_id, &reply).await?;
            }

            Effect::ShowProject { project } => {
                let summary = self
                    .db
                    .project_summary(owner_id, &project)?
                    .ok_or_else(|| DbError::NotFound(format!("project {project}")))?;
                let skills = self.db.skills_for_project(owner_id, &project)?;
                self.transport
                    .send_text(chat_id, &project_card(&summary, &skills))
                    .await?;
                if let Some(file_name) = self.db.photo_for_project(&project, owner_id)? {
                    if self.photos.exists(&file_name).await {
                        self.transport
                            .send_photo(chat_id, &self.photos.path(&file_name))
                            .await?;
                    } else {
                        tracing::warn!(
                            owner_id,
                            file = %file_name,
                            "Recorded photo is missing on disk"
                        );
                    }
                }
            }

            Effect::ListProjects => {
                let projects = self.db.list_projects(owner_id)?;
                let reply = if projects.is_empty() {
                    Reply::text(NO_PROJECTS)
                } else {
                    project_list(&projects)
                };
                self.transport.send_text(chat_id, &reply).await?;
            }

            Effect::CreateProject { name, url, status } => {
                let status_id = self.db.resolve_status_id(&status)?;
                self.db
                    .create_project(owner_id, &name, Some(&url), Some(status_id))?;
                let project_id = self.db.resolve_project_id(&name, owner_id)?;
                tracing::info!(owner_id, project_id, project = %name, "Project created");
            }

            Effect::AddSkill { project, skill } => {
                self.db.add_skill_to_project(owner_id, &project, &skill)?;
                tracing::info!(owner_id, project = %project, skill = %skill, "Skill linked");
            }

            Effect::DeleteProject { project } => {
                let project_id = self.db.resolve_project_id(&project, owner_id)?;
                self.db.delete_project(owner_id, project_id)?;
                tracing::info!(owner_id, project_id, project = %project, "Project deleted");
            }

            Effect::UpdateProject {
                project,
                field,
                value,
            } => {
                let update = match field {
                    EditableField::Name => {
                        return self.rename_project(owner_id, &project, value).await;
                    }
                    EditableField::Description => ProjectUpdate::Description(value),
                    EditableField::Url => ProjectUpdate::Url(value),
                    EditableField::Status => {
                        ProjectUpdate::StatusId(self.db.resolve_status_id(&value)?)
                    }
                };
                self.db.update_project_field(&update, &project, owner_id)?;
                tracing::info!(owner_id, project = %project, ?field, "Project updated");
            }

            Effect::SavePhoto { project, file_id } => {
                // Fail before downloading if the project is gone
                self.db.resolve_project_id(&project, owner_id)?;
                let bytes = self
                    .transport
                    .download_photo(&file_id)
                    .await
                    .map_err(EngineError::Download)?;
                let file_name = self.photos.save(owner_id, &project, &bytes).await?;
                self.db
                    .update_project_field(&ProjectUpdate::Photo(file_name), &project, owner_id)?;
                tracing::info!(owner_id, project = %project, "Project photo saved");
            }
        }
        Ok(())
    }
}
