//! Bot API wire types
//!
//! Only the fields the bot reads are declared; serde ignores the rest.

use crate::presentation::Keyboard;
use crate::runtime::{Payload, Update};
use serde::Deserialize;
use serde_json::{json, Value};

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
    pub callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct TgMessage {
    pub chat: TgChat,
    pub from: Option<TgUser>,
    pub text: Option<String>,
    /// Available sizes of a photo, smallest first
    pub photo: Option<Vec<TgPhotoSize>>,
}

#[derive(Debug, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TgUser {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TgPhotoSize {
    pub file_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TgCallbackQuery {
    pub id: String,
    pub from: TgUser,
    pub message: Option<TgMessage>,
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TgFile {
    pub file_path: Option<String>,
}

impl TgUpdate {
    /// Map to an engine update; updates without a sender (channel posts,
    /// edits, polls, ...) are dropped
    pub fn into_update(self) -> Option<Update> {
        if let Some(query) = self.callback_query {
            let data = query.data?;
            let chat_id = query.message.map_or(query.from.id, |m| m.chat.id);
            return Some(Update {
                chat_id,
                owner_id: query.from.id,
                payload: Payload::Selection {
                    callback_id: query.id,
                    data,
                },
            });
        }

        let message = self.message?;
        let owner_id = message.from?.id;
        let payload = if let Some(text) = message.text {
            Payload::Text(text)
        } else if let Some(largest) = message.photo.and_then(|sizes| sizes.into_iter().last()) {
            Payload::Photo {
                file_id: largest.file_id,
            }
        } else {
            Payload::Other
        };
        Some(Update {
            chat_id: message.chat.id,
            owner_id,
            payload,
        })
    }
}

/// `reply_markup` for a keyboard; `None` leaves the chat's keyboard alone
pub fn reply_markup(keyboard: &Keyboard) -> Option<Value> {
    match keyboard {
        Keyboard::Unchanged => None,
        Keyboard::Remove => Some(json!({ "remove_keyboard": true })),
        Keyboard::Choice { .. } => {
            let rows: Vec<Value> = keyboard
                .buttons()
                .into_iter()
                .map(|label| json!([{ "text": label }]))
                .collect();
            Some(json!({
                "keyboard": rows,
                "one_time_keyboard": true,
                "resize_keyboard": true,
            }))
        }
        Keyboard::Inline { buttons } => {
            let rows: Vec<Value> = buttons
                .iter()
                .map(|b| json!([{ "text": b.label, "callback_data": b.data }]))
                .collect();
            Some(json!({ "inline_keyboard": rows }))
        }
    }
}
