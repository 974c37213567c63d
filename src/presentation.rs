//! Reply formatting
//!
//! Pure text and menu rendering for project cards, project lists and the
//! fixed notices of the bot.

use crate::db::{Project, ProjectSummary};

/// Universal cancel phrase, always offered as the last choice button
pub const CANCEL_BUTTON: &str = "Отмена 🚫";

/// Placeholder for missing values on cards
pub const EMPTY_VALUE: &str = "—";

pub const HELP_TEXT: &str = "📌 <b>Доступные команды:</b>\n\n\
/new_project – создать новый проект 🆕\n\
/projects – список проектов 📋\n\
/skills – добавить навык 🛠️\n\
/update_projects – изменить проект ✏️\n\
/delete – удалить проект ❌\n\
/add_description – добавить описание 📄\n\
/add_photo – прикрепить фото 📷\n\
/info – показать эту справку ℹ️";

pub const GREETING: &str = "👋 Привет! Я бот‑портфолио 🤖\nСохраняй и просматривай свои проекты!";

pub const CANCELLED: &str = "Чтобы посмотреть команды, используй: /info";

pub const NO_PROJECTS: &str = "У тебя пока нет проектов!\nДобавь их командой /new_project";

pub const NEED_HELP: &str = "Нужна помощь?";

pub const PROJECT_NOT_FOUND: &str = "❌ Проект не найден.";

pub const PHOTO_NOT_RECEIVED: &str = "❌ Не удалось получить фото, попробуйте ещё раз: /add_photo";

pub const STORE_FAILURE: &str = "⚠️ Не удалось выполнить операцию, попробуйте позже.";

/// Reply markup attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Keyboard {
    /// Leave whatever keyboard the chat currently shows
    #[default]
    Unchanged,
    /// Hide the reply keyboard
    Remove,
    /// One-time, resized reply keyboard; the cancel button is appended
    Choice { options: Vec<String> },
    /// Inline buttons, one per row
    Inline { buttons: Vec<InlineButton> },
}

impl Keyboard {
    pub fn choice(options: &[String]) -> Self {
        Keyboard::Choice {
            options: options.to_vec(),
        }
    }

    /// Button labels in display order, cancel included for choice menus
    pub fn buttons(&self) -> Vec<String> {
        match self {
            Keyboard::Unchanged | Keyboard::Remove => Vec::new(),
            Keyboard::Choice { options } => options
                .iter()
                .cloned()
                .chain(std::iter::once(CANCEL_BUTTON.to_string()))
                .collect(),
            Keyboard::Inline { buttons } => buttons.iter().map(|b| b.label.clone()).collect(),
        }
    }
}

/// Inline button; `data` comes back in the callback and is limited to
/// 64 bytes by the Bot API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub data: String,
}

impl InlineButton {
    /// Button opening a project card; the callback carries the project id
    pub fn project(project: &Project) -> Self {
        Self {
            label: project.name.clone(),
            data: project.id.to_string(),
        }
    }
}

/// An outgoing text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
    /// Text uses Telegram HTML markup
    pub html: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Unchanged,
            html: false,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            html: true,
            ..Self::text(text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }

    /// Prompt with a choice menu
    pub fn choice(text: impl Into<String>, options: &[String]) -> Self {
        Self::text(text).with_keyboard(Keyboard::choice(options))
    }
}

/// Escape user-provided text for Telegram HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            other => out.push(other),
        }
    }
    out
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => escape_html(v),
        _ => EMPTY_VALUE.to_string(),
    }
}

/// Project card: name, description, link, status and skills
pub fn project_card(summary: &ProjectSummary, skills: &str) -> Reply {
    let skills = if skills.is_empty() { None } else { Some(skills) };
    let text = format!(
        "📁 <b>{}</b>\n📝 Описание: {}\n🔗 Ссылка: {}\n📊 Статус: {}\n🛠️ Навыки: {}",
        escape_html(&summary.name),
        or_dash(summary.description.as_deref()),
        or_dash(summary.url.as_deref()),
        or_dash(summary.status_name.as_deref()),
        or_dash(skills),
    );
    Reply::html(text).with_keyboard(Keyboard::Remove)
}

/// Combined list of an owner's projects with an inline menu of their names
pub fn project_list(projects: &[Project]) -> Reply {
    let text = projects
        .iter()
        .map(|p| {
            format!(
                "📁 <b>{}</b>\n🔗 {}",
                escape_html(&p.name),
                or_dash(p.url.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    Reply::html(text).with_keyboard(Keyboard::Inline {
        buttons: projects.iter().map(InlineButton::project).collect(),
    })
}
