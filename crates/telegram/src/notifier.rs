use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use sigtrade_core::Notifier;

/// Sends notifications to a Telegram chat via the Bot API.
pub struct TelegramNotifier {
    http_client: Client,
    base_url: String,
    chat_id: i64,
}

impl TelegramNotifier {
    #[must_use]
    pub fn new(bot_token: &str, chat_id: i64) -> Self {
        Self {
            http_client: Client::new(),
            base_url: format!("https://api.telegram.org/bot{bot_token}"),
            chat_id,
        }
    }

    /// Override the API host, for tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/sendMessage", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
            }))
            .send()
            .await
            .context("telegram sendMessage request failed")?;

        let body: serde_json::Value = response.json().await?;
        if body.get("ok").and_then(serde_json::Value::as_bool) != Some(true) {
            anyhow::bail!("telegram rejected sendMessage: {body}");
        }
        Ok(())
    }
}

/// Notifier that swallows everything. Wired in dry-run mode so simulated
/// runs produce logs only, never outward messages.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send_message(&self, text: &str) -> Result<()> {
        tracing::info!(suppressed_notification = text, "dry run: notification suppressed");
        Ok(())
    }
}
