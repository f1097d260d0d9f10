use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::domain::Article;
use crate::history::SeenSet;
use crate::sources::{ScrapeContext, Source};

pub const DEFAULT_WORKERS: usize = 16;

/// Runs every source concurrently and merges their new articles.
pub struct ScraperRunner {
    semaphore: Arc<Semaphore>,
}

impl Default for ScraperRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScraperRunner {
    pub fn new() -> Self {
        Self::with_workers(DEFAULT_WORKERS)
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// One task per source, joined in source order. A source that fails,
    /// times out or panics contributes nothing; the others are unaffected.
    pub async fn run(
        &self,
        sources: &[Arc<dyn Source>],
        ctx: &ScrapeContext,
        seen: Arc<SeenSet>,
    ) -> Vec<Article> {
        let mut handles = Vec::with_capacity(sources.len());

        for source in sources {
            let name = source.source_name().to_string();
            let source = source.clone();
            let ctx = ctx.clone();
            let seen = seen.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return Vec::new();
                };
                source.fetch_new(&ctx, &seen).await
            });

            handles.push((name, handle));
        }

        let mut merged = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(articles) => merged.extend(articles),
                Err(e) => error!("[{}] Task join error: {}", name, e),
            }
        }

        info!("Scrapers returned {} new articles total", merged.len());
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{IntelError, Result};
    use crate::sources::testing::{context, StaticFetcher};
    use async_trait::async_trait;
    use std::time::Duration;

    enum Behaviour {
        Yield(Vec<&'static str>),
        Fail,
        Panic,
        Slow(Duration, Vec<&'static str>),
    }

    struct FakeSource {
        name: String,
        behaviour: Behaviour,
    }

    fn fake(name: &str, behaviour: Behaviour) -> Arc<dyn Source> {
        Arc::new(FakeSource {
            name: name.to_string(),
            behaviour,
        })
    }

    fn articles(name: &str, urls: &[&str]) -> Vec<Article> {
        urls.iter()
            .map(|u| Article::new(name, *u, format!("title {}", u), "body"))
            .collect()
    }

    #[async_trait]
    impl Source for FakeSource {
        fn source_name(&self) -> &str {
            &self.name
        }

        async fn fetch_raw(&self, _ctx: &ScrapeContext) -> Result<Vec<Article>> {
            match &self.behaviour {
                Behaviour::Yield(urls) => Ok(articles(&self.name, urls)),
                Behaviour::Fail => Err(IntelError::Timeout("navigation".into())),
                Behaviour::Panic => panic!("extractor bug"),
                Behaviour::Slow(delay, urls) => {
                    tokio::time::sleep(*delay).await;
                    Ok(articles(&self.name, urls))
                }
            }
        }
    }

    fn urls(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.url.as_str()).collect()
    }

    #[tokio::test]
    async fn test_merges_in_source_order() {
        let sources = vec![
            fake("slow", Behaviour::Slow(Duration::from_millis(50), vec!["s1", "s2"])),
            fake("fast", Behaviour::Yield(vec!["f1"])),
        ];
        let merged = ScraperRunner::new()
            .run(&sources, &context(StaticFetcher::default()), Arc::new(SeenSet::default()))
            .await;

        assert_eq!(urls(&merged), vec!["s1", "s2", "f1"]);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let sources = vec![
            fake("ok-a", Behaviour::Yield(vec!["a"])),
            fake("broken", Behaviour::Fail),
            fake("crashing", Behaviour::Panic),
            fake("ok-b", Behaviour::Yield(vec!["b"])),
        ];
        let merged = ScraperRunner::new()
            .run(&sources, &context(StaticFetcher::default()), Arc::new(SeenSet::default()))
            .await;

        assert_eq!(urls(&merged), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_seen_urls_are_filtered() {
        let sources = vec![fake("page", Behaviour::Yield(vec!["A", "B"]))];
        let seen: SeenSet = ["A"].into_iter().collect();

        let merged = ScraperRunner::new()
            .run(&sources, &context(StaticFetcher::default()), Arc::new(seen))
            .await;

        assert_eq!(urls(&merged), vec!["B"]);
    }

    #[tokio::test]
    async fn test_no_cross_source_dedup() {
        let sources = vec![
            fake("one", Behaviour::Yield(vec!["same"])),
            fake("two", Behaviour::Yield(vec!["same"])),
        ];
        let merged = ScraperRunner::with_workers(1)
            .run(&sources, &context(StaticFetcher::default()), Arc::new(SeenSet::default()))
            .await;

        assert_eq!(merged.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_source_set() {
        let merged = ScraperRunner::new()
            .run(&[], &context(StaticFetcher::default()), Arc::new(SeenSet::default()))
            .await;
        assert!(merged.is_empty());
    }
}
