use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::Result;
use crate::domain::Article;
use crate::normalizer::Normalizer;
use crate::sources::{ScrapeContext, Source};

/// An RSS/Atom feed registered under a source name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedTarget {
    pub name: String,
    pub url: String,
}

impl FeedTarget {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn presets() -> Vec<Self> {
        vec![
            Self::new("astanatimes", "https://astanatimes.com/feed/"),
            Self::new("producthunt", "https://www.producthunt.com/feed"),
            Self::new("openai_blog", "https://openai.com/blog/rss.xml"),
            Self::new("hf_blog", "https://huggingface.co/blog/feed.xml"),
        ]
    }
}

pub struct FeedSource {
    target: FeedTarget,
    normalizer: Normalizer,
}

impl FeedSource {
    pub fn new(target: FeedTarget) -> Self {
        Self {
            target,
            normalizer: Normalizer::new(),
        }
    }
}

#[async_trait]
impl Source for FeedSource {
    fn source_name(&self) -> &str {
        &self.target.name
    }

    async fn fetch_raw(&self, ctx: &ScrapeContext) -> Result<Vec<Article>> {
        info!("[{}] Fetching feed: {}", self.target.name, self.target.url);

        let body = ctx.fetcher.fetch(&self.target.url).await?;
        let articles = self.normalizer.normalize(&self.target.name, &body)?;

        info!("[{}] Parsed {} feed entries", self.target.name, articles.len());
        Ok(articles)
    }
}
