//! Runtime for executing dialogs
//!
//! Owns the per-user dialog table and turns inbound updates into transitions
//! whose effects run against the catalog, the photo library and the transport.

mod executor;
mod photos;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationEngine;
pub use photos::PhotoLibrary;
pub use traits::*;

use crate::db::OwnerId;
use crate::state_machine::DialogState;
use chrono::{DateTime, Utc};

/// One inbound message or button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub chat_id: ChatId,
    pub owner_id: OwnerId,
    pub payload: Payload,
}

/// What the user sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Photo { file_id: String },
    /// Sticker, document, voice and other attachments
    Other,
    /// Inline button press; `data` is the project id
    Selection { callback_id: String, data: String },
}

impl Update {
    #[allow(dead_code)] // Used in tests
    pub fn text(chat_id: ChatId, owner_id: OwnerId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            owner_id,
            payload: Payload::Text(text.into()),
        }
    }
}

/// A dialog in progress
#[derive(Debug, Clone)]
pub struct DialogSession {
    pub state: DialogState,
    /// Last time an update advanced or repeated this dialog
    pub touched_at: DateTime<Utc>,
}

impl DialogSession {
    pub fn new(state: DialogState, touched_at: DateTime<Utc>) -> Self {
        Self { state, touched_at }
    }
}
