//! Hacker News top stories via the public Firebase REST API.

use async_trait::async_trait;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::Result;
use crate::domain::Article;
use crate::sources::html::strip_markup;
use crate::sources::{ScrapeContext, Source};

pub const HN_API: &str = "https://hacker-news.firebaseio.com/v0";
const DISCUSSION_BASE: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackerNewsConfig {
    pub enabled: bool,
    pub api_base: String,
    /// Cap on detail calls per run (default: 15)
    pub max_stories: usize,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: HN_API.to_string(),
            max_stories: 15,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HnItem {
    id: u64,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    title: String,
    url: Option<String>,
    text: Option<String>,
    time: Option<i64>,
}

pub struct HackerNewsSource {
    config: HackerNewsConfig,
}

impl HackerNewsSource {
    pub const NAME: &'static str = "hackernews";

    pub fn new(config: HackerNewsConfig) -> Self {
        Self { config }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn fetch_item(&self, ctx: &ScrapeContext, id: u64) -> Result<Option<HnItem>> {
        let body = ctx.fetcher.fetch(&self.api_url(&format!("item/{}.json", id))).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Stories only; self-posts link to their discussion page.
fn to_article(item: HnItem) -> Option<Article> {
    let title = item.title.trim();
    if item.kind != "story" || title.is_empty() {
        return None;
    }

    let url = item
        .url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| format!("{}{}", DISCUSSION_BASE, item.id));

    let text = item.text.as_deref().map(strip_markup).unwrap_or_default();
    let raw_content = if text.is_empty() {
        title.to_string()
    } else {
        format!("{}. {}", title, text)
    };

    let published = item
        .time
        .and_then(|t| DateTime::from_timestamp(t, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default();

    Some(Article::new(HackerNewsSource::NAME, url, title, raw_content).with_published_at(published))
}

#[async_trait]
impl Source for HackerNewsSource {
    fn source_name(&self) -> &str {
        Self::NAME
    }

    async fn fetch_raw(&self, ctx: &ScrapeContext) -> Result<Vec<Article>> {
        info!("[{}] Fetching top stories", Self::NAME);

        let body = ctx.fetcher.fetch(&self.api_url("topstories.json")).await?;
        let story_ids: Vec<u64> = serde_json::from_slice(&body)?;

        let mut articles = Vec::new();
        for id in story_ids.into_iter().take(self.config.max_stories) {
            let item = match self.fetch_item(ctx, id).await {
                Ok(Some(item)) => item,
                Ok(None) => continue,
                Err(e) => {
                    debug!("[{}] Skipping item {}: {}", Self::NAME, id, e);
                    continue;
                }
            };
            if let Some(article) = to_article(item) {
                articles.push(article);
            }
        }

        info!("[{}] Fetched {} stories", Self::NAME, articles.len());
        Ok(articles)
    }
}
