//! Inputs that drive dialog transitions

/// Operator commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Info,
    NewProject,
    Projects,
    Skills,
    UpdateProjects,
    Delete,
    AddDescription,
    AddPhoto,
    Cancel,
}

impl Command {
    /// Parse a slash command. `/cmd@BotName` and trailing arguments are
    /// accepted; anything unknown is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name {
            "start" => Some(Command::Start),
            "info" => Some(Command::Info),
            "new_project" => Some(Command::NewProject),
            "projects" => Some(Command::Projects),
            "skills" => Some(Command::Skills),
            "update_projects" => Some(Command::UpdateProjects),
            "delete" => Some(Command::Delete),
            "add_description" => Some(Command::AddDescription),
            "add_photo" => Some(Command::AddPhoto),
            "cancel" => Some(Command::Cancel),
            _ => None,
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Command(Command),
    /// Plain text, including choice-keyboard presses
    Text(String),
    Photo { file_id: String },
    /// Any other attachment (sticker, document, voice, ...)
    Other,
    /// Inline button press on the project list
    Selection { project: String },
}

impl Event {
    /// Classify an incoming text message
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        match Command::parse(&text) {
            Some(command) => Event::Command(command),
            None => Event::Text(text),
        }
    }
}
