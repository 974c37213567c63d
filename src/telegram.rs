//! Telegram Bot API transport
//!
//! Long-polls `getUpdates` and implements [`Transport`] over the plain HTTP
//! Bot API.

mod types;

use crate::presentation::Reply;
use crate::runtime::{ChatId, ConversationEngine, Transport, TransportError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use types::{reply_markup, ApiResponse, TgFile, TgUpdate};

/// Pause after a failed poll before trying again
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Bot API client; cheap to clone
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    /// `{api_url}/bot{token}`
    method_base: String,
    /// `{api_url}/file/bot{token}`
    file_base: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, TransportError> {
        let api_url = api_url.trim_end_matches('/');
        // The HTTP timeout must outlast the long poll itself
        let client = Client::builder()
            .timeout(poll_timeout + Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            method_base: format!("{api_url}/bot{token}"),
            file_base: format!("{api_url}/file/bot{token}"),
            poll_timeout,
        })
    }

    async fn decode<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();
        let body = response.text().await?;
        let parsed: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            TransportError::api(format!("{method}: HTTP {status}, unreadable response ({e})"))
        })?;
        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TransportError::api(format!(
                "{method}: {}",
                description.unwrap_or_else(|| format!("HTTP {status}"))
            ))),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(format!("{}/{method}", self.method_base))
            .json(body)
            .send()
            .await?;
        Self::decode(method, response).await
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<TgUpdate>, TransportError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.poll_timeout.as_secs(),
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    /// Feed updates to the engine one at a time until cancelled
    pub async fn run_polling<T: Transport>(
        &self,
        engine: &ConversationEngine<T>,
        cancel: CancellationToken,
    ) {
        tracing::info!("Polling for updates");
        let mut offset = 0;
        loop {
            let batch = tokio::select! {
                () = cancel.cancelled() => break,
                batch = self.get_updates(offset) => batch,
            };

            match batch {
                Ok(updates) => {
                    for raw in updates {
                        offset = offset.max(raw.update_id + 1);
                        let Some(update) = raw.into_update() else {
                            continue;
                        };
                        let owner_id = update.owner_id;
                        if let Err(e) = engine.handle(update).await {
                            tracing::warn!(owner_id, error = %e, "Failed to deliver reply");
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Polling failed");
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }
        tracing::info!("Polling stopped");
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_text(&self, chat_id: ChatId, reply: &Reply) -> Result<(), TransportError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": reply.text,
        });
        if reply.html {
            body["parse_mode"] = json!("HTML");
        }
        if let Some(markup) = reply_markup(&reply.keyboard) {
            body["reply_markup"] = markup;
        }
        self.call::<Value>("sendMessage", &body).await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: ChatId, path: &Path) -> Result<(), TransportError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "photo.jpg".to_string(), |n| n.to_string_lossy().into_owned());
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", Part::bytes(bytes).file_name(file_name));
        let response = self
            .client
            .post(format!("{}/sendPhoto", self.method_base))
            .multipart(form)
            .send()
            .await?;
        Self::decode::<Value>("sendPhoto", response).await?;
        Ok(())
    }

    async fn download_photo(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        let file: TgFile = self.call("getFile", &json!({ "file_id": file_id })).await?;
        let file_path = file
            .file_path
            .ok_or_else(|| TransportError::api(format!("getFile: no path for {file_id}")))?;
        let response = self
            .client
            .get(format!("{}/{file_path}", self.file_base))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        self.call::<Value>(
            "answerCallbackQuery",
            &json!({ "callback_query_id": callback_id }),
        )
        .await?;
        Ok(())
    }
}
