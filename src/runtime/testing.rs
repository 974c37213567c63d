//! Mock implementations for testing
//!
//! These mocks enable engine scenarios without a real Bot API.

use super::traits::{ChatId, Transport, TransportError};
use crate::presentation::Reply;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Something the engine sent to a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { chat_id: ChatId, reply: Reply },
    Photo { chat_id: ChatId, path: PathBuf },
}

/// Transport that records outbound traffic and serves queued downloads
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<Sent>>,
    downloads: Mutex<VecDeque<Vec<u8>>>,
    /// File ids requested through `download_photo`
    requested: Mutex<Vec<String>>,
    answered: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the bytes returned by the next download
    pub fn queue_download(&self, bytes: Vec<u8>) {
        self.downloads.lock().unwrap().push_back(bytes);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts of all sent messages, in order
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Sent::Text { reply, .. } => Some(reply.text.clone()),
                Sent::Photo { .. } => None,
            })
            .collect()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn answered(&self) -> Vec<String> {
        self.answered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(&self, chat_id: ChatId, reply: &Reply) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id,
            reply: reply.clone(),
        });
        Ok(())
    }

    async fn send_photo(&self, chat_id: ChatId, path: &Path) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(Sent::Photo {
            chat_id,
            path: path.to_path_buf(),
        });
        Ok(())
    }

    async fn download_photo(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        self.requested.lock().unwrap().push(file_id.to_string());
        self.downloads
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::api(format!("No download queued for {file_id}")))
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        self.answered.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }
}
