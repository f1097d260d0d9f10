//! Source adapters: one per origin family.
//!
//! # Architecture
//!
//! ```text
//! Source::fetch_raw (render / GET / feed pull → extract)
//!        → Source::fetch_new (history filter, soft failure)
//!        → ScraperRunner (fan-out, merge)
//! ```
//!
//! Every adapter implements [`Source::fetch_raw`]; the provided
//! [`Source::fetch_new`] applies the history filter and turns any error into
//! an empty, logged result so one broken target never affects the others.

pub mod feed;
pub mod hackernews;
pub mod html;
pub mod page;
pub mod telegram;

pub use feed::{FeedSource, FeedTarget};
pub use hackernews::{HackerNewsConfig, HackerNewsSource};
pub use page::{PageSource, PageTarget};
pub use telegram::TelegramSource;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::app::Result;
use crate::domain::Article;
use crate::fetcher::Fetcher;
use crate::history::SeenSet;
use crate::render::Renderer;

/// Resources shared by every source for the duration of one run.
#[derive(Clone)]
pub struct ScrapeContext {
    pub renderer: Arc<dyn Renderer>,
    pub fetcher: Arc<dyn Fetcher>,
}

impl ScrapeContext {
    pub fn new(renderer: Arc<dyn Renderer>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { renderer, fetcher }
    }
}

/// Trait for source adapters
#[async_trait]
pub trait Source: Send + Sync {
    /// Stable tag used in logs and as `Article::source`
    fn source_name(&self) -> &str;

    /// Fetch the target and extract every candidate item, seen or not
    async fn fetch_raw(&self, ctx: &ScrapeContext) -> Result<Vec<Article>>;

    /// Items not present in `seen`; errors are logged and yield nothing
    async fn fetch_new(&self, ctx: &ScrapeContext, seen: &SeenSet) -> Vec<Article> {
        let name = self.source_name();

        let raw = match self.fetch_raw(ctx).await {
            Ok(articles) => articles,
            Err(e) => {
                error!("[{}] Scraping failed: {}", name, e);
                return Vec::new();
            }
        };

        let found = raw.len();
        let fresh: Vec<Article> = raw.into_iter().filter(|a| !seen.contains(&a.url)).collect();
        info!("[{}] Found {} articles ({} new)", name, found, fresh.len());
        fresh
    }
}

/// Which targets to scrape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Public channels read through `t.me/s/<channel>`
    pub telegram_channels: Vec<String>,

    /// RSS/Atom feeds
    pub feeds: Vec<FeedTarget>,

    /// HTML news pages rendered in the browser
    pub pages: Vec<PageTarget>,

    pub hackernews: HackerNewsConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            telegram_channels: [
                "the_tech_kz",
                "digitalkazakhstan",
                "astanahub",
                "forbeskazakhstan",
                "therundownai",
                "tldrtech",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            feeds: FeedTarget::presets(),
            pages: PageTarget::presets(),
            hackernews: HackerNewsConfig::default(),
        }
    }
}

/// Instantiate the adapter set once, in a fixed order.
pub fn build_sources(config: &SourcesConfig) -> Vec<Arc<dyn Source>> {
    let mut sources: Vec<Arc<dyn Source>> = Vec::new();

    for channel in &config.telegram_channels {
        sources.push(Arc::new(TelegramSource::new(channel.as_str())));
    }
    for feed in &config.feeds {
        sources.push(Arc::new(FeedSource::new(feed.clone())));
    }
    for page in &config.pages {
        sources.push(Arc::new(PageSource::new(page.clone())));
    }
    if config.hackernews.enabled {
        sources.push(Arc::new(HackerNewsSource::new(config.hackernews.clone())));
    }

    sources
}
