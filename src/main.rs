//! Portfolio Bot - project catalog over Telegram
//!
//! Keeps each user's projects (link, status, description, skills, photo) in
//! SQLite and drives the multi-step dialogs that edit them.

mod config;
mod db;
mod presentation;
mod runtime;
mod state_machine;
mod telegram;

use config::BotConfig;
use db::Database;
use runtime::{ConversationEngine, PhotoLibrary};
use std::sync::Arc;
use std::time::Duration;
use telegram::TelegramClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often abandoned dialogs are looked for
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_bot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env()?;

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;
    db.seed_defaults()?;

    let photos = PhotoLibrary::new(&config.photo_dir);
    tracing::info!(dir = %photos.dir().display(), "Photo library ready");

    let client = TelegramClient::new(&config.api_url, &config.token, config.poll_timeout)?;
    let engine = Arc::new(ConversationEngine::new(
        db,
        photos,
        client.clone(),
        chrono::Duration::from_std(config.dialog_ttl)?,
    ));

    let cancel = CancellationToken::new();

    // Ctrl-C stops polling and sweeping
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            cancel.cancel();
        });
    }

    let sweeper = {
        let engine = Arc::clone(&engine);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let expired = engine.sweep_expired(chrono::Utc::now()).await;
                        if expired > 0 {
                            let remaining = engine.active_dialogs().await;
                            tracing::info!(expired, remaining, "Dropped abandoned dialogs");
                        }
                    }
                }
            }
        })
    };

    client.run_polling(&engine, cancel).await;
    sweeper.await?;

    Ok(())
}
