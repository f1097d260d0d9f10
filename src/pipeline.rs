use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::{Article, RunStats};
use crate::history::HistoryStore;
use crate::notifier::Notifier;
use crate::runner::ScraperRunner;
use crate::scorer::{ScoreMode, Scorer};
use crate::sources::{ScrapeContext, Source};

/// One scheduled run: scrape, score, notify, persist history.
pub struct Pipeline {
    pub runner: ScraperRunner,
    pub sources: Vec<Arc<dyn Source>>,
    pub history: HistoryStore,
    pub scorer: Arc<dyn Scorer>,
    pub notifier: Arc<dyn Notifier>,
    pub mode: ScoreMode,
}

impl Pipeline {
    /// Never fails: source, scorer and delivery errors are logged and the
    /// run carries on. Every fetched URL is marked seen whether or not it
    /// was approved, and `last_run` is stamped even when nothing was found.
    pub async fn run(&self, ctx: ScrapeContext) -> RunStats {
        let mut history = self.history.load();
        let seen = Arc::new(history.snapshot());
        info!(
            "Loaded history: {} URLs already seen ({})",
            seen.len(),
            self.history.path().display()
        );

        let articles = self.runner.run(&self.sources, &ctx, seen).await;
        ctx.renderer.shutdown().await;

        let mut stats = RunStats {
            scraped: articles.len(),
            ..Default::default()
        };

        if articles.is_empty() {
            info!("No new articles found");
        } else {
            let verdicts = self.scorer.score(&articles).await;
            let approved = self.mode.approve(verdicts);
            stats.approved = approved.len();
            info!("{} articles approved for delivery", stats.approved);

            let by_id: HashMap<String, Article> = articles
                .iter()
                .map(|a| (a.id.clone(), a.clone()))
                .collect();
            stats.sent = self.notifier.notify(&approved, &by_id).await;
        }

        if !self.notifier.send_digest(&stats).await {
            warn!("Status digest was not delivered");
        }

        history.mark_seen(articles.iter().map(|a| a.url.as_str()));
        match self.history.save(&mut history) {
            Ok(()) => info!("Saved history ({} URLs)", history.scraped_urls.len()),
            Err(e) => error!("Failed to save history: {}", e),
        }

        info!(
            "Pipeline complete: {} scraped, {} approved, {} sent",
            stats.scraped, stats.approved, stats.sent
        );
        stats
    }
}
