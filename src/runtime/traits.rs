//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the engine with mock implementations.

use crate::presentation::Reply;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Chat the bot is talking in
pub type ChatId = i64;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Bot API error: {0}")]
    Api(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api(message.into())
    }
}

/// Outbound side of the messaging platform
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a text message with its reply markup
    async fn send_text(&self, chat_id: ChatId, reply: &Reply) -> Result<(), TransportError>;

    /// Send a stored photo file
    async fn send_photo(&self, chat_id: ChatId, path: &Path) -> Result<(), TransportError>;

    /// Fetch the bytes of an inbound photo attachment
    async fn download_photo(&self, file_id: &str) -> Result<Vec<u8>, TransportError>;

    /// Acknowledge an inline button press
    async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_text(&self, chat_id: ChatId, reply: &Reply) -> Result<(), TransportError> {
        (**self).send_text(chat_id, reply).await
    }

    async fn send_photo(&self, chat_id: ChatId, path: &Path) -> Result<(), TransportError> {
        (**self).send_photo(chat_id, path).await
    }

    async fn download_photo(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        (**self).download_photo(file_id).await
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        (**self).answer_callback(callback_id).await
    }
}
