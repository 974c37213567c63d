//! Property-based tests for the dialog state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::presentation::{Keyboard, CANCEL_BUTTON};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> DialogContext {
    DialogContext {
        owner_id: 1,
        statuses: vec!["Draft".to_string(), "Live".to_string(), "Done".to_string()],
        skills: vec!["Python".to_string(), "SQL".to_string()],
        projects: vec!["Alpha".to_string(), "Beta".to_string()],
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{0,12}"
}

fn arb_field() -> impl Strategy<Value = EditableField> {
    prop_oneof![
        Just(EditableField::Name),
        Just(EditableField::Description),
        Just(EditableField::Url),
        Just(EditableField::Status),
    ]
}

fn arb_projects() -> impl Strategy<Value = Vec<String>> {
    Just(test_context().projects)
}

/// Any non-idle dialog step
fn arb_dialog_state() -> impl Strategy<Value = DialogState> {
    prop_oneof![
        arb_projects().prop_map(|existing| DialogState::NewProjectName { existing }),
        arb_name().prop_map(|name| DialogState::NewProjectUrl { name }),
        (arb_name(), arb_name())
            .prop_map(|(name, url)| DialogState::NewProjectStatus { name, url }),
        arb_projects().prop_map(|projects| DialogState::AddSkillProject { projects }),
        arb_name().prop_map(|project| DialogState::AddSkillSkill {
            project,
            skills: test_context().skills,
        }),
        arb_projects().prop_map(|projects| DialogState::DeleteProject { projects }),
        arb_projects().prop_map(|projects| DialogState::UpdateProject { projects }),
        arb_projects().prop_map(|projects| DialogState::UpdateField {
            project: "Alpha".to_string(),
            projects,
        }),
        arb_field().prop_map(|field| DialogState::UpdateValue {
            project: "Alpha".to_string(),
            field,
            projects: test_context().projects,
        }),
        arb_projects().prop_map(|projects| DialogState::DescriptionProject { projects }),
        arb_name().prop_map(|project| DialogState::DescriptionText { project }),
        arb_projects().prop_map(|projects| DialogState::PhotoProject { projects }),
        arb_name().prop_map(|project| DialogState::PhotoAwaiting { project }),
    ]
}

/// Steps whose input must come from a menu
fn arb_choice_state() -> impl Strategy<Value = DialogState> {
    prop_oneof![
        (arb_name(), arb_name())
            .prop_map(|(name, url)| DialogState::NewProjectStatus { name, url }),
        arb_projects().prop_map(|projects| DialogState::AddSkillProject { projects }),
        arb_name().prop_map(|project| DialogState::AddSkillSkill {
            project,
            skills: test_context().skills,
        }),
        arb_projects().prop_map(|projects| DialogState::DeleteProject { projects }),
        arb_projects().prop_map(|projects| DialogState::UpdateProject { projects }),
        arb_projects().prop_map(|projects| DialogState::UpdateField {
            project: "Alpha".to_string(),
            projects,
        }),
        Just(DialogState::UpdateValue {
            project: "Alpha".to_string(),
            field: EditableField::Status,
            projects: test_context().projects,
        }),
        arb_projects().prop_map(|projects| DialogState::DescriptionProject { projects }),
        arb_projects().prop_map(|projects| DialogState::PhotoProject { projects }),
    ]
}

fn arb_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Start),
        Just(Command::Info),
        Just(Command::NewProject),
        Just(Command::Projects),
        Just(Command::Skills),
        Just(Command::UpdateProjects),
        Just(Command::Delete),
        Just(Command::AddDescription),
        Just(Command::AddPhoto),
        Just(Command::Cancel),
    ]
}

/// Text drawn mostly from the menus so that dialogs actually advance
fn arb_text() -> impl Strategy<Value = String> {
    let ctx = test_context();
    let mut vocabulary: Vec<String> = ctx
        .statuses
        .into_iter()
        .chain(ctx.skills)
        .chain(ctx.projects)
        .chain(EditableField::labels())
        .collect();
    vocabulary.push(CANCEL_BUTTON.to_string());
    prop_oneof![
        4 => proptest::sample::select(vocabulary),
        1 => arb_name(),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => arb_text().prop_map(Event::Text),
        1 => arb_command().prop_map(Event::Command),
        1 => "[a-z0-9]{6}".prop_map(|file_id| Event::Photo { file_id }),
        1 => Just(Event::Other),
        1 => arb_name().prop_map(|project| Event::Selection { project }),
    ]
}

/// The menu attached to the last reply, if any
fn last_menu(result: &TransitionResult) -> Option<&Keyboard> {
    result.effects.iter().rev().find_map(|e| match e {
        Effect::Reply(r) if matches!(r.keyboard, Keyboard::Choice { .. }) => Some(&r.keyboard),
        _ => None,
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Cancel from any step returns to Idle without touching the store
    #[test]
    fn prop_cancel_returns_to_idle(state in arb_dialog_state(), use_button in any::<bool>()) {
        let event = if use_button {
            Event::Text(CANCEL_BUTTON.to_string())
        } else {
            Event::Command(Command::Cancel)
        };
        let result = transition(&state, &test_context(), event);
        prop_assert!(result.new_state.is_idle());
        prop_assert!(!result.effects.iter().any(Effect::is_mutation));
    }

    // Input outside the menu keeps every collected value and repeats the menu
    #[test]
    fn prop_invalid_choice_is_a_self_loop(state in arb_choice_state(), junk in "[0-9]{1,8}") {
        let ctx = test_context();
        let first = transition(&state, &ctx, Event::Text(junk.clone()));
        prop_assert_eq!(&first.new_state, &state);
        prop_assert!(!first.effects.iter().any(Effect::is_mutation));
        prop_assert!(last_menu(&first).is_some(), "no menu re-rendered for {:?}", state);

        // Retrying is unbounded and stable
        let second = transition(&first.new_state, &ctx, Event::Text(junk));
        prop_assert_eq!(&second.new_state, &state);
        prop_assert_eq!(last_menu(&first), last_menu(&second));
    }

    // Mutations are only emitted by a terminal step
    #[test]
    fn prop_mutations_only_on_return_to_idle(events in proptest::collection::vec(arb_event(), 0..30)) {
        let ctx = test_context();
        let mut state = DialogState::Idle;
        for event in events {
            let result = transition(&state, &ctx, event);
            let mutations = result.effects.iter().filter(|e| e.is_mutation()).count();
            prop_assert!(mutations <= 1, "more than one mutation: {:?}", result.effects);
            if mutations == 1 {
                prop_assert!(result.new_state.is_idle());
                // The mutation precedes its confirmation
                prop_assert!(result.effects[0].is_mutation());
            }
            state = result.new_state;
        }
    }

    // Mutations only reference options that were offered
    #[test]
    fn prop_mutations_use_offered_options(events in proptest::collection::vec(arb_event(), 0..30)) {
        let ctx = test_context();
        let mut state = DialogState::Idle;
        for event in events {
            let result = transition(&state, &ctx, event);
            for effect in &result.effects {
                match effect {
                    Effect::CreateProject { status, .. } => {
                        prop_assert!(ctx.statuses.contains(status));
                    }
                    Effect::AddSkill { project, skill } => {
                        prop_assert!(ctx.projects.contains(project));
                        prop_assert!(ctx.skills.contains(skill));
                    }
                    Effect::DeleteProject { project } | Effect::SavePhoto { project, .. } => {
                        prop_assert!(ctx.projects.contains(project));
                    }
                    Effect::UpdateProject { project, field, value } => {
                        prop_assert!(ctx.projects.contains(project));
                        if *field == EditableField::Status {
                            prop_assert!(ctx.statuses.contains(value));
                        }
                    }
                    _ => {}
                }
            }
            state = result.new_state;
        }
    }

    // Inline selections never disturb a dialog
    #[test]
    fn prop_selection_keeps_state(state in arb_dialog_state(), project in arb_name()) {
        let event = Event::Selection { project: project.clone() };
        let result = transition(&state, &test_context(), event);
        prop_assert_eq!(result.new_state, state);
        prop_assert_eq!(result.effects, vec![Effect::ShowProject { project }]);
    }
}
