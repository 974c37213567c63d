//! Pure dialog transition function
//!
//! Given the current step, fresh reference data and one input, computes the
//! next step and the effects to run. No I/O happens here.

use super::event::Command;
use super::state::{DialogContext, DialogState, EditableField};
use super::{Effect, Event};
use crate::presentation::{
    Keyboard, Reply, CANCELLED, CANCEL_BUTTON, GREETING, HELP_TEXT, NEED_HELP, NO_PROJECTS,
};

const ASK_NAME: &str = "📌 Введите название проекта:";
const NAME_TAKEN: &str = "⚠️ Проект с таким названием уже есть, введите другое название:";
const ASK_URL: &str = "🔗 Введите ссылку на проект:";
const ASK_STATUS: &str = "📊 Выберите текущий статус проекта:";
const BAD_STATUS: &str = "⚠️ Статус не распознан, выберите из списка:";
const PROJECT_SAVED: &str = "✅ Проект сохранён!";

const ASK_SKILL_PROJECT: &str = "🛠️ Выберите проект для добавления навыка:";
const ASK_SKILL: &str = "🔧 Выберите навык:";
const BAD_SKILL: &str = "❌ Навык не распознан, повторите:";

const ASK_DELETE: &str = "❌ Выберите проект для удаления:";
const BAD_DELETE: &str = "❌ Неверный выбор, повторите:";

const ASK_UPDATE_PROJECT: &str = "✏️ Выберите проект для редактирования:";
const ASK_FIELD: &str = "Что изменить?";
const BAD_FIELD: &str = "❌ Опция не распознана, повторите:";
const BAD_NEW_STATUS: &str = "❌ Статус неверен, выберите из списка:";
const EMPTY_VALUE: &str = "⚠️ Значение не может быть пустым, попробуйте ещё раз:";
const UPDATED: &str = "✅ Обновлено!";

const ASK_DESCRIPTION_PROJECT: &str = "📄 Выберите проект для описания:";
const ASK_DESCRIPTION: &str = "📝 Введите текст описания:";
const DESCRIPTION_SAVED: &str = "✅ Описание сохранено!";

const ASK_PHOTO_PROJECT: &str = "📷 Выберите проект для фото:";
const ASK_PHOTO: &str = "Отправьте фото проекта в ответ на это сообщение:";
const NOT_A_PHOTO: &str = "❌ Это не фото, попробуйте ещё раз.";
const PHOTO_SAVED: &str = "✅ Фото сохранено!";

const BAD_PROJECT: &str = "❌ Проект не найден, повторите:";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DialogState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DialogState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_reply(self, reply: Reply) -> Self {
        self.with_effect(Effect::Reply(reply))
    }
}

/// Pure transition function
///
/// Every (state, event) pair has a defined outcome: invalid input keeps the
/// current state and repeats its menu, so there is no error path.
pub fn transition(state: &DialogState, ctx: &DialogContext, event: Event) -> TransitionResult {
    match (state, event) {
        // Inline buttons work from anywhere and leave the dialog untouched
        (state, Event::Selection { project }) => {
            TransitionResult::new(state.clone()).with_effect(Effect::ShowProject { project })
        }

        (_, Event::Command(Command::Cancel)) => cancelled(),

        // A command always abandons the current dialog
        (_, Event::Command(command)) => start(command, ctx),

        (DialogState::Idle, Event::Text(text)) => fallback(ctx, text.trim()),

        // Attachments outside a dialog are ignored
        (DialogState::Idle, _) => TransitionResult::new(DialogState::Idle),

        (_, Event::Text(text)) if text.trim() == CANCEL_BUTTON => cancelled(),

        (DialogState::PhotoAwaiting { project }, Event::Photo { file_id }) => {
            TransitionResult::new(DialogState::Idle)
                .with_effect(Effect::SavePhoto {
                    project: project.clone(),
                    file_id,
                })
                .with_reply(Reply::text(PHOTO_SAVED).with_keyboard(Keyboard::Remove))
        }

        (state, Event::Text(text)) => {
            advance(state, ctx, text.trim()).unwrap_or_else(|| retry(state, ctx))
        }

        (state, Event::Photo { .. } | Event::Other) => retry(state, ctx),
    }
}

fn cancelled() -> TransitionResult {
    TransitionResult::new(DialogState::Idle)
        .with_reply(Reply::text(CANCELLED).with_keyboard(Keyboard::Remove))
}

fn help() -> Reply {
    Reply::html(HELP_TEXT)
}

/// Entry point of every command
fn start(command: Command, ctx: &DialogContext) -> TransitionResult {
    let projects = &ctx.projects;
    match command {
        Command::Start => TransitionResult::new(DialogState::Idle)
            .with_reply(Reply::text(GREETING))
            .with_reply(help()),
        Command::Info => TransitionResult::new(DialogState::Idle).with_reply(help()),
        Command::Cancel => cancelled(),
        Command::NewProject => TransitionResult::new(DialogState::NewProjectName {
            existing: projects.clone(),
        })
        .with_reply(Reply::text(ASK_NAME).with_keyboard(Keyboard::Remove)),
        _ if projects.is_empty() => {
            TransitionResult::new(DialogState::Idle).with_reply(Reply::text(NO_PROJECTS))
        }
        Command::Projects => {
            TransitionResult::new(DialogState::Idle).with_effect(Effect::ListProjects)
        }
        Command::Skills => TransitionResult::new(DialogState::AddSkillProject {
            projects: projects.clone(),
        })
        .with_reply(Reply::choice(ASK_SKILL_PROJECT, projects)),
        Command::Delete => TransitionResult::new(DialogState::DeleteProject {
            projects: projects.clone(),
        })
        .with_reply(Reply::choice(ASK_DELETE, projects)),
        Command::UpdateProjects => TransitionResult::new(DialogState::UpdateProject {
            projects: projects.clone(),
        })
        .with_reply(Reply::choice(ASK_UPDATE_PROJECT, projects)),
        Command::AddDescription => TransitionResult::new(DialogState::DescriptionProject {
            projects: projects.clone(),
        })
        .with_reply(Reply::choice(ASK_DESCRIPTION_PROJECT, projects)),
        Command::AddPhoto => TransitionResult::new(DialogState::PhotoProject {
            projects: projects.clone(),
        })
        .with_reply(Reply::choice(ASK_PHOTO_PROJECT, projects)),
    }
}

/// Text outside a dialog: a project name opens its card, anything else gets help
fn fallback(ctx: &DialogContext, text: &str) -> TransitionResult {
    if ctx.projects.iter().any(|p| p == text) {
        TransitionResult::new(DialogState::Idle).with_effect(Effect::ShowProject {
            project: text.to_string(),
        })
    } else {
        TransitionResult::new(DialogState::Idle)
            .with_reply(Reply::text(NEED_HELP))
            .with_reply(help())
    }
}

fn contains(options: &[String], value: &str) -> bool {
    options.iter().any(|o| o == value)
}

/// Accept an answer for the current step; `None` falls back to the generic retry
fn advance(state: &DialogState, ctx: &DialogContext, input: &str) -> Option<TransitionResult> {
    let result = match state {
        DialogState::Idle | DialogState::PhotoAwaiting { .. } => return None,

        // ---- /new_project ----
        DialogState::NewProjectName { existing } => {
            if input.is_empty() {
                return None;
            }
            if contains(existing, input) {
                return Some(
                    TransitionResult::new(state.clone()).with_reply(Reply::text(NAME_TAKEN)),
                );
            }
            TransitionResult::new(DialogState::NewProjectUrl {
                name: input.to_string(),
            })
            .with_reply(Reply::text(ASK_URL))
        }
        DialogState::NewProjectUrl { name } => {
            if input.is_empty() {
                return None;
            }
            TransitionResult::new(DialogState::NewProjectStatus {
                name: name.clone(),
                url: input.to_string(),
            })
            .with_reply(Reply::choice(ASK_STATUS, &ctx.statuses))
        }
        DialogState::NewProjectStatus { name, url } => {
            if !contains(&ctx.statuses, input) {
                return None;
            }
            TransitionResult::new(DialogState::Idle)
                .with_effect(Effect::CreateProject {
                    name: name.clone(),
                    url: url.clone(),
                    status: input.to_string(),
                })
                .with_reply(Reply::text(PROJECT_SAVED).with_keyboard(Keyboard::Remove))
        }

        // ---- /skills ----
        DialogState::AddSkillProject { projects } => {
            if !contains(projects, input) {
                return None;
            }
            TransitionResult::new(DialogState::AddSkillSkill {
                project: input.to_string(),
                skills: ctx.skills.clone(),
            })
            .with_reply(Reply::choice(ASK_SKILL, &ctx.skills))
        }
        DialogState::AddSkillSkill { project, skills } => {
            if !contains(skills, input) {
                return None;
            }
            TransitionResult::new(DialogState::Idle)
                .with_effect(Effect::AddSkill {
                    project: project.clone(),
                    skill: input.to_string(),
                })
                .with_reply(
                    Reply::text(format!("✅ Навык «{input}» добавлен к «{project}»."))
                        .with_keyboard(Keyboard::Remove),
                )
        }

        // ---- /delete ----
        DialogState::DeleteProject { projects } => {
            if !contains(projects, input) {
                return None;
            }
            TransitionResult::new(DialogState::Idle)
                .with_effect(Effect::DeleteProject {
                    project: input.to_string(),
                })
                .with_reply(
                    Reply::text(format!("✅ Проект «{input}» удалён."))
                        .with_keyboard(Keyboard::Remove),
                )
        }

        // ---- /update_projects ----
        DialogState::UpdateProject { projects } => {
            if !contains(projects, input) {
                return None;
            }
            TransitionResult::new(DialogState::UpdateField {
                project: input.to_string(),
                projects: projects.clone(),
            })
            .with_reply(Reply::choice(ASK_FIELD, &EditableField::labels()))
        }
        DialogState::UpdateField { project, projects } => {
            let field = EditableField::from_label(input)?;
            let keyboard = if field == EditableField::Status {
                Keyboard::choice(&ctx.statuses)
            } else {
                Keyboard::Remove
            };
            TransitionResult::new(DialogState::UpdateValue {
                project: project.clone(),
                field,
                projects: projects.clone(),
            })
            .with_reply(Reply::text(field.prompt()).with_keyboard(keyboard))
        }
        DialogState::UpdateValue {
            project,
            field,
            projects,
        } => {
            let valid = match field {
                EditableField::Status => contains(&ctx.statuses, input),
                EditableField::Name | EditableField::Description | EditableField::Url => {
                    !input.is_empty()
                }
            };
            if !valid {
                return None;
            }
            if *field == EditableField::Name && input != project && contains(projects, input) {
                return Some(
                    TransitionResult::new(state.clone()).with_reply(Reply::text(NAME_TAKEN)),
                );
            }
            TransitionResult::new(DialogState::Idle)
                .with_effect(Effect::UpdateProject {
                    project: project.clone(),
                    field: *field,
                    value: input.to_string(),
                })
                .with_reply(Reply::text(UPDATED).with_keyboard(Keyboard::Remove))
        }

        // ---- /add_description ----
        DialogState::DescriptionProject { projects } => {
            if !contains(projects, input) {
                return None;
            }
            TransitionResult::new(DialogState::DescriptionText {
                project: input.to_string(),
            })
            .with_reply(Reply::text(ASK_DESCRIPTION).with_keyboard(Keyboard::Remove))
        }
        DialogState::DescriptionText { project } => {
            if input.is_empty() {
                return None;
            }
            TransitionResult::new(DialogState::Idle)
                .with_effect(Effect::UpdateProject {
                    project: project.clone(),
                    field: EditableField::Description,
                    value: input.to_string(),
                })
                .with_reply(Reply::text(DESCRIPTION_SAVED).with_keyboard(Keyboard::Remove))
        }

        // ---- /add_photo ----
        DialogState::PhotoProject { projects } => {
            if !contains(projects, input) {
                return None;
            }
            TransitionResult::new(DialogState::PhotoAwaiting {
                project: input.to_string(),
            })
            .with_reply(Reply::text(ASK_PHOTO).with_keyboard(Keyboard::Remove))
        }
    };
    Some(result)
}

/// Stay on the current step and repeat its menu
fn retry(state: &DialogState, ctx: &DialogContext) -> TransitionResult {
    let reply = match state {
        DialogState::Idle => return TransitionResult::new(DialogState::Idle),
        DialogState::NewProjectName { .. } => Reply::text(ASK_NAME),
        DialogState::NewProjectUrl { .. } => Reply::text(ASK_URL),
        DialogState::NewProjectStatus { .. } => Reply::choice(BAD_STATUS, &ctx.statuses),
        DialogState::AddSkillProject { projects }
        | DialogState::UpdateProject { projects }
        | DialogState::DescriptionProject { projects }
        | DialogState::PhotoProject { projects } => Reply::choice(BAD_PROJECT, projects),
        DialogState::AddSkillSkill { skills, .. } => Reply::choice(BAD_SKILL, skills),
        DialogState::DeleteProject { projects } => Reply::choice(BAD_DELETE, projects),
        DialogState::UpdateField { .. } => Reply::choice(BAD_FIELD, &EditableField::labels()),
        DialogState::UpdateValue { field, .. } => match field {
            EditableField::Status => Reply::choice(BAD_NEW_STATUS, &ctx.statuses),
            EditableField::Name | EditableField::Description | EditableField::Url => {
                Reply::text(EMPTY_VALUE)
            }
        },
        DialogState::DescriptionText { .. } => Reply::text(ASK_DESCRIPTION),
        DialogState::PhotoAwaiting { .. } => Reply::text(NOT_A_PHOTO),
    };
    TransitionResult::new(state.clone()).with_reply(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context() -> DialogContext {
        DialogContext {
            owner_id: 42,
            statuses: vec!["Draft".to_string(), "Done".to_string()],
            skills: vec!["Python".to_string(), "SQL".to_string()],
            projects: vec!["Alpha".to_string(), "Beta".to_string()],
        }
    }

    fn text(s: &str) -> Event {
        Event::Text(s.to_string())
    }

    fn replies(result: &TransitionResult) -> Vec<&Reply> {
        result
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::Reply(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Feed a sequence of events starting from Idle
    fn run(ctx: &DialogContext, events: Vec<Event>) -> (DialogState, Vec<Effect>) {
        let mut state = DialogState::Idle;
        let mut effects = Vec::new();
        for event in events {
            let result = transition(&state, ctx, event);
            state = result.new_state;
            effects = result.effects;
        }
        (state, effects)
    }

    #[test]
    fn test_new_project_full_chain() {
        let ctx = test_context();
        let (state, effects) = run(
            &ctx,
            vec![
                Event::Command(Command::NewProject),
                text("Gamma"),
                text("http://x"),
                text("Done"),
            ],
        );
        assert!(state.is_idle());
        assert_eq!(
            effects[0],
            Effect::CreateProject {
                name: "Gamma".to_string(),
                url: "http://x".to_string(),
                status: "Done".to_string(),
            }
        );
        assert!(matches!(&effects[1], Effect::Reply(r) if r.text == PROJECT_SAVED));
    }

    #[test]
    fn test_new_project_rejects_existing_name() {
        let ctx = test_context();
        let state = DialogState::NewProjectName {
            existing: ctx.projects.clone(),
        };
        let result = transition(&state, &ctx, text("Alpha"));
        assert_eq!(result.new_state, state);
        assert_eq!(replies(&result)[0].text, NAME_TAKEN);
    }

    #[test]
    fn test_status_menu_uses_fresh_statuses() {
        let mut ctx = test_context();
        let state = DialogState::NewProjectStatus {
            name: "Gamma".to_string(),
            url: "u".to_string(),
        };
        // A status added after the dialog started is accepted
        ctx.statuses.push("Archived".to_string());
        let result = transition(&state, &ctx, text("Archived"));
        assert!(result.new_state.is_idle());
        assert!(result.effects.iter().any(Effect::is_mutation));
    }

    #[test]
    fn test_invalid_status_keeps_values_and_menu() {
        let ctx = test_context();
        let state = DialogState::NewProjectStatus {
            name: "Gamma".to_string(),
            url: "http://x".to_string(),
        };
        let result = transition(&state, &ctx, text("Nope"));
        assert_eq!(result.new_state, state);
        let reply = replies(&result)[0];
        assert_eq!(reply.text, BAD_STATUS);
        assert_eq!(reply.keyboard, Keyboard::choice(&ctx.statuses));
    }

    #[test]
    fn test_commands_needing_projects_without_any() {
        let mut ctx = test_context();
        ctx.projects.clear();
        for command in [
            Command::Projects,
            Command::Skills,
            Command::Delete,
            Command::UpdateProjects,
            Command::AddDescription,
            Command::AddPhoto,
        ] {
            let result = transition(&DialogState::Idle, &ctx, Event::Command(command));
            assert!(result.new_state.is_idle(), "{command:?}");
            assert_eq!(replies(&result)[0].text, NO_PROJECTS);
        }
    }

    #[test]
    fn test_add_skill_chain() {
        let ctx = test_context();
        let (state, effects) = run(
            &ctx,
            vec![
                Event::Command(Command::Skills),
                text("Beta"),
                text("COBOL"),
                text("SQL"),
            ],
        );
        assert!(state.is_idle());
        assert_eq!(
            effects[0],
            Effect::AddSkill {
                project: "Beta".to_string(),
                skill: "SQL".to_string(),
            }
        );
    }

    #[test]
    fn test_skill_list_is_captured_when_prompted() {
        let mut ctx = test_context();
        let prompt = DialogState::AddSkillProject {
            projects: ctx.projects.clone(),
        };
        let state = transition(&prompt, &ctx, text("Alpha")).new_state;
        ctx.skills.push("Rust".to_string());
        let result = transition(&state, &ctx, text("Rust"));
        assert_eq!(result.new_state, state);
        assert_eq!(replies(&result)[0].text, BAD_SKILL);
    }

    #[test]
    fn test_update_status_field() {
        let ctx = test_context();
        let (state, effects) = run(
            &ctx,
            vec![
                Event::Command(Command::UpdateProjects),
                text("Alpha"),
                text("Статус"),
                text("Draft"),
            ],
        );
        assert!(state.is_idle());
        assert_eq!(
            effects[0],
            Effect::UpdateProject {
                project: "Alpha".to_string(),
                field: EditableField::Status,
                value: "Draft".to_string(),
            }
        );
    }

    #[test]
    fn test_update_status_prompt_offers_statuses() {
        let ctx = test_context();
        let state = DialogState::UpdateField {
            project: "Alpha".to_string(),
            projects: ctx.projects.clone(),
        };
        let result = transition(&state, &ctx, text("Статус"));
        assert_eq!(replies(&result)[0].keyboard, Keyboard::choice(&ctx.statuses));

        let result = transition(&state, &ctx, text("Ссылка"));
        assert_eq!(replies(&result)[0].keyboard, Keyboard::Remove);
    }

    #[test]
    fn test_rename_to_other_existing_project_is_rejected() {
        let ctx = test_context();
        let state = DialogState::UpdateValue {
            project: "Alpha".to_string(),
            field: EditableField::Name,
            projects: ctx.projects.clone(),
        };
        let result = transition(&state, &ctx, text("Beta"));
        assert_eq!(result.new_state, state);

        let result = transition(&state, &ctx, text("Alpha 2"));
        assert!(result.new_state.is_idle());
    }

    #[test]
    fn test_delete_chain() {
        let ctx = test_context();
        let (state, effects) = run(
            &ctx,
            vec![Event::Command(Command::Delete), text("Alpha")],
        );
        assert!(state.is_idle());
        assert_eq!(
            effects[0],
            Effect::DeleteProject {
                project: "Alpha".to_string()
            }
        );
    }

    #[test]
    fn test_description_chain() {
        let ctx = test_context();
        let (state, effects) = run(
            &ctx,
            vec![
                Event::Command(Command::AddDescription),
                text("Beta"),
                text("A bot that keeps my portfolio"),
            ],
        );
        assert!(state.is_idle());
        assert_eq!(
            effects[0],
            Effect::UpdateProject {
                project: "Beta".to_string(),
                field: EditableField::Description,
                value: "A bot that keeps my portfolio".to_string(),
            }
        );
    }

    #[test]
    fn test_photo_step_reprompts_until_photo() {
        let ctx = test_context();
        let state = DialogState::PhotoAwaiting {
            project: "Alpha".to_string(),
        };
        for event in [text("hello"), Event::Other] {
            let result = transition(&state, &ctx, event);
            assert_eq!(result.new_state, state);
            assert_eq!(replies(&result)[0].text, NOT_A_PHOTO);
        }
        let result = transition(
            &state,
            &ctx,
            Event::Photo {
                file_id: "f1".to_string(),
            },
        );
        assert!(result.new_state.is_idle());
        assert_eq!(
            result.effects[0],
            Effect::SavePhoto {
                project: "Alpha".to_string(),
                file_id: "f1".to_string(),
            }
        );
    }

    #[test]
    fn test_cancel_button_and_command() {
        let ctx = test_context();
        let state = DialogState::UpdateField {
            project: "Alpha".to_string(),
            projects: ctx.projects.clone(),
        };
        for event in [text(CANCEL_BUTTON), Event::Command(Command::Cancel)] {
            let result = transition(&state, &ctx, event);
            assert!(result.new_state.is_idle());
            assert!(!result.effects.iter().any(Effect::is_mutation));
            assert_eq!(replies(&result)[0].text, CANCELLED);
        }
    }

    #[test]
    fn test_command_abandons_dialog() {
        let ctx = test_context();
        let state = DialogState::NewProjectUrl {
            name: "Gamma".to_string(),
        };
        let result = transition(&state, &ctx, Event::Command(Command::Delete));
        assert!(matches!(result.new_state, DialogState::DeleteProject { .. }));
    }

    #[test]
    fn test_selection_keeps_dialog() {
        let ctx = test_context();
        let state = DialogState::NewProjectUrl {
            name: "Gamma".to_string(),
        };
        let result = transition(
            &state,
            &ctx,
            Event::Selection {
                project: "Alpha".to_string(),
            },
        );
        assert_eq!(result.new_state, state);
        assert_eq!(
            result.effects,
            vec![Effect::ShowProject {
                project: "Alpha".to_string()
            }]
        );
    }

    #[test]
    fn test_fallback_matches_project_name() {
        let ctx = test_context();
        let result = transition(&DialogState::Idle, &ctx, text("Beta"));
        assert_eq!(
            result.effects,
            vec![Effect::ShowProject {
                project: "Beta".to_string()
            }]
        );

        let result = transition(&DialogState::Idle, &ctx, text("what?"));
        let texts: Vec<_> = replies(&result).iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec![NEED_HELP, HELP_TEXT]);
    }

    #[test]
    fn test_start_greets_then_helps() {
        let ctx = test_context();
        let result = transition(&DialogState::Idle, &ctx, Event::Command(Command::Start));
        let texts: Vec<_> = replies(&result).iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec![GREETING, HELP_TEXT]);
    }

    #[test]
    fn test_idle_ignores_attachments() {
        let ctx = test_context();
        let result = transition(&DialogState::Idle, &ctx, Event::Other);
        assert!(result.new_state.is_idle());
        assert!(result.effects.is_empty());
    }
}
