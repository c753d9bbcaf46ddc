mod polling;
mod reporter;

use crate::core::error::ConfigError;
use crate::core::settings::{Credentials, Settings};
use crate::core::state::PollState;
use crate::notifier::{Notifier, TelegramNotifier};
use crate::providers::{PracticumProvider, StatusSource};
use anyhow::{Context, Result};
use polling::PollLoop;
use reporter::ErrorReporter;
use std::sync::Arc;

pub async fn run(settings: Settings, credentials: Credentials) -> Result<()> {
    tracing::info!("Starting homework-bot daemon");

    let timeout = settings.polling.request_timeout();

    let source: Arc<dyn StatusSource> = Arc::new(
        PracticumProvider::new(
            &settings.endpoints.status_url,
            &credentials.practicum_token,
            timeout,
        )
        .context("Failed to set up status API client")?,
    );

    let notifier: Arc<dyn Notifier> = Arc::new(
        TelegramNotifier::new(
            &settings.endpoints.bot_api_url,
            &credentials.telegram_token,
            &credentials.chat_id,
            timeout,
        )
        .context("Failed to set up Telegram client")?,
    );

    let operator: Option<Arc<dyn Notifier>> = match &credentials.operator_chat_id {
        Some(chat_id) => {
            tracing::info!(chat_id = %chat_id, "Operator error reports enabled");
            let operator: Arc<dyn Notifier> = Arc::new(
                TelegramNotifier::new(
                    &settings.endpoints.bot_api_url,
                    &credentials.telegram_token,
                    chat_id,
                    timeout,
                )
                .context("Failed to set up operator Telegram client")?,
            );
            Some(operator)
        }
        None => {
            tracing::info!("No operator chat configured, failures are only logged");
            None
        }
    };

    let state = settings
        .polling
        .lookback()
        .and_then(PollState::starting_now)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: "polling.lookback_secs".to_string(),
            reason: format!("{} seconds is out of range", settings.polling.lookback_secs),
        })?;

    let poller = PollLoop::new(
        source,
        notifier,
        ErrorReporter::new(operator),
        state,
        settings.polling.interval(),
    );

    poller.run(shutdown_signal()).await;

    tracing::info!("homework-bot daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
