use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::app::Result;
use crate::domain::{Article, RunStats, Verdict};
use crate::notifier::{format_digest, format_message, Notifier};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Bot API root (default: https://api.telegram.org)
    pub api_base: String,

    #[serde(skip_serializing)]
    pub bot_token: String,

    pub chat_id: String,

    /// Pause after each article message in milliseconds (default: 1000)
    pub send_delay_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
            send_delay_ms: 1000,
        }
    }
}

impl NotifierConfig {
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Delivers messages through the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    config: NotifierConfig,
}

impl TelegramNotifier {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn send_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }

    async fn send(&self, text: &str) -> Result<()> {
        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text,
            disable_web_page_preview: false,
        };

        let response = self.client.post(self.send_url()).json(&payload).send().await?;
        response.error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, approved: &[Verdict], articles: &HashMap<String, Article>) -> usize {
        if approved.is_empty() {
            info!("Nothing to send, approved list is empty");
            return 0;
        }
        if !self.config.is_configured() {
            error!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID is not set");
            return 0;
        }

        let mut sent = 0;
        for verdict in approved {
            let Some(article) = articles.get(&verdict.id) else {
                warn!("No article found for id={}, skipping", verdict.id);
                continue;
            };

            match self.send(&format_message(article, verdict)).await {
                Ok(()) => {
                    sent += 1;
                    info!("Sent message for [{}] {}", article.source, article.title);
                }
                Err(e) => error!("Telegram delivery failed: {}", e),
            }

            tokio::time::sleep(self.config.send_delay()).await;
        }

        info!("Telegram delivery complete: {}/{} sent", sent, approved.len());
        sent
    }

    async fn send_digest(&self, stats: &RunStats) -> bool {
        if !self.config.is_configured() {
            error!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID is not set, digest not sent");
            return false;
        }

        match self.send(&format_digest(stats)).await {
            Ok(()) => {
                info!("Status digest sent");
                true
            }
            Err(e) => {
                error!("Failed to send status digest: {}", e);
                false
            }
        }
    }
}
