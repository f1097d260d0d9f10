//! Public Telegram channels via the `t.me/s/<channel>` web preview.
//!
//! Widget DOM:
//! - message bubble: `.tgme_widget_message[data-post="channel/1234"]`
//! - post text: `.tgme_widget_message_text`
//! - date: `.tgme_widget_message_date time[datetime]`

use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use tracing::info;

use crate::app::Result;
use crate::domain::Article;
use crate::render::RenderRequest;
use crate::sources::html::{inner_text, line_text, selector, truncate_chars};
use crate::sources::{ScrapeContext, Source};

pub const TELEGRAM_BASE: &str = "https://t.me";

const MESSAGE_SELECTOR: &str = ".tgme_widget_message";
const TEXT_SELECTOR: &str = ".tgme_widget_message_text:not(.js-message_reply_text)";
const DATE_SELECTOR: &str = "time.datetime, .tgme_widget_message_date time";
const TITLE_MAX_CHARS: usize = 120;
const READY_TIMEOUT: Duration = Duration::from_secs(20);

pub struct TelegramSource {
    channel: String,
    name: String,
}

impl TelegramSource {
    pub fn new(channel: impl Into<String>) -> Self {
        let channel = channel.into();
        let name = format!("tg/{}", channel);
        Self { channel, name }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn target_url(&self) -> String {
        format!("{}/s/{}", TELEGRAM_BASE, self.channel)
    }

    /// One article per message bubble that carries both a post id and text.
    pub fn extract(&self, html: &str) -> Result<Vec<Article>> {
        let messages = selector(MESSAGE_SELECTOR)?;
        let text = selector(TEXT_SELECTOR)?;
        let date = selector(DATE_SELECTOR)?;

        let document = Html::parse_document(html);
        let mut articles = Vec::new();

        for message in document.select(&messages) {
            let Some(post) = message.value().attr("data-post").map(str::trim) else {
                continue;
            };
            if post.is_empty() {
                continue;
            }

            let Some(text_el) = message.select(&text).next() else {
                continue;
            };
            let full_text = inner_text(text_el);
            if full_text.is_empty() {
                continue;
            }

            let first_line = full_text.lines().next().unwrap_or_default();
            let title = truncate_chars(first_line, TITLE_MAX_CHARS);

            let published = message
                .select(&date)
                .next()
                .map(|el| match el.value().attr("datetime") {
                    Some(dt) if !dt.trim().is_empty() => dt.trim().to_string(),
                    _ => line_text(el),
                })
                .unwrap_or_default();

            articles.push(
                Article::new(&self.name, format!("{}/{}", TELEGRAM_BASE, post), title, full_text)
                    .with_published_at(published),
            );
        }

        Ok(articles)
    }
}

#[async_trait]
impl Source for TelegramSource {
    fn source_name(&self) -> &str {
        &self.name
    }

    async fn fetch_raw(&self, ctx: &ScrapeContext) -> Result<Vec<Article>> {
        let url = self.target_url();
        info!("[{}] Navigating to {}", self.name, url);

        let html = ctx
            .renderer
            .render(&RenderRequest::new(url, MESSAGE_SELECTOR, READY_TIMEOUT))
            .await?;

        let articles = self.extract(&html)?;
        info!("[{}] Parsed {} messages", self.name, articles.len());
        Ok(articles)
    }
}
