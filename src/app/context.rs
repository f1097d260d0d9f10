use std::sync::Arc;

use tracing::{info, warn};

use crate::app::error::{IntelError, Result};
use crate::config::Config;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::history::HistoryStore;
use crate::notifier::TelegramNotifier;
use crate::pipeline::Pipeline;
use crate::render::{ChromeRenderer, Renderer, UnavailableRenderer};
use crate::runner::ScraperRunner;
use crate::scorer::LlmScorer;
use crate::sources::{build_sources, ScrapeContext};

/// Wires configuration into the pipeline and its run-scoped resources.
pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher>,
    pub pipeline: Pipeline,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        if config.history_path.as_os_str().is_empty() {
            return Err(IntelError::Config("history_path must not be empty".into()));
        }
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.http)?);

        let pipeline = Pipeline {
            runner: ScraperRunner::with_workers(config.browser.max_concurrency),
            sources: build_sources(&config.sources),
            history: HistoryStore::new(config.history_path.clone()),
            scorer: Arc::new(LlmScorer::new(config.scorer.clone())),
            notifier: Arc::new(TelegramNotifier::new(config.notifier.clone())),
            mode: config.scorer.mode(),
        };
        info!("Configured {} sources", pipeline.sources.len());

        Ok(Self {
            config,
            fetcher,
            pipeline,
        })
    }

    /// Start the shared browser. If Chrome cannot be launched, page and
    /// Telegram sources fail individually while HTTP sources still run.
    pub async fn launch_renderer(&self) -> Arc<dyn Renderer> {
        match ChromeRenderer::launch(self.config.browser.clone()).await {
            Ok(renderer) => Arc::new(renderer),
            Err(e) => {
                warn!("Browser unavailable, rendered sources will be skipped: {}", e);
                Arc::new(UnavailableRenderer::new(e.to_string()))
            }
        }
    }

    pub async fn scrape_context(&self) -> ScrapeContext {
        ScrapeContext::new(self.launch_renderer().await, self.fetcher.clone())
    }
}
