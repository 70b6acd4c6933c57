use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;

const POLL_TIMEOUT_SECS: u64 = 30;
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct UpdatesEnvelope {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
    channel_post: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Long-polling inbound transport.
///
/// Forwards the text of every message from the configured signal chat into
/// the engine channel, in arrival order. Messages from other chats are
/// dropped. Poll failures back off and continue; the loop only exits when
/// the receiving side goes away.
pub struct TelegramSignalSource {
    http_client: Client,
    base_url: String,
    signal_chat_id: i64,
    offset: i64,
}

impl TelegramSignalSource {
    #[must_use]
    pub fn new(bot_token: &str, signal_chat_id: i64) -> Self {
        Self {
            http_client: Client::new(),
            base_url: format!("https://api.telegram.org/bot{bot_token}"),
            signal_chat_id,
            offset: 0,
        }
    }

    /// Runs the polling loop until the engine channel closes.
    pub async fn run(mut self, tx: mpsc::Sender<String>) {
        tracing::info!(chat_id = self.signal_chat_id, "telegram signal source started");
        loop {
            match self.poll_once().await {
                Ok(texts) => {
                    for text in texts {
                        if tx.send(text).await.is_err() {
                            tracing::info!("engine channel closed, stopping signal source");
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "telegram poll failed, backing off");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            }
        }
    }

    async fn poll_once(&mut self) -> Result<Vec<String>> {
        let url = format!(
            "{}/getUpdates?timeout={}&offset={}&allowed_updates=[\"message\",\"channel_post\"]",
            self.base_url, POLL_TIMEOUT_SECS, self.offset
        );
        let response = self
            .http_client
            .get(&url)
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .send()
            .await
            .context("getUpdates request failed")?;
        let envelope: UpdatesEnvelope = response
            .json()
            .await
            .context("malformed getUpdates response")?;
        if !envelope.ok {
            anyhow::bail!("telegram getUpdates returned ok=false");
        }

        let mut texts = Vec::new();
        for update in envelope.result {
            self.offset = self.offset.max(update.update_id + 1);
            let message = update.message.or(update.channel_post);
            let Some(message) = message else { continue };
            if message.chat.id != self.signal_chat_id {
                continue;
            }
            if let Some(text) = message.text {
                texts.push(text);
            }
        }
        Ok(texts)
    }
}
