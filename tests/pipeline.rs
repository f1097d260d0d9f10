use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use startupintel::app::{IntelError, Result};
use startupintel::domain::{Article, RunStats, Verdict};
use startupintel::fetcher::Fetcher;
use startupintel::history::{History, HistoryStore};
use startupintel::notifier::{format_message, Notifier};
use startupintel::pipeline::Pipeline;
use startupintel::render::{RenderRequest, Renderer};
use startupintel::runner::ScraperRunner;
use startupintel::scorer::{ScoreMode, Scorer};
use startupintel::sources::{PageSource, PageTarget, ScrapeContext, Source};

const NEWS_URL: &str = "https://news.test/";
const U1: &str = "https://news.test/a1";
const U2: &str = "https://news.test/a2";

const NEWS_PAGE: &str = r#"<html><body>
  <article><a href="/a1"><h2>Fintech startup opens Astana office</h2></a><p>Hiring 20 engineers.</p></article>
  <article><a href="/a2"><h2>Weekly weather roundup</h2></a><p>Rain expected.</p></article>
</body></html>"#;

#[derive(Default)]
struct FakeRenderer {
    pages: HashMap<String, String>,
    shutdowns: AtomicUsize,
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<String> {
        self.pages
            .get(&request.url)
            .cloned()
            .ok_or_else(|| IntelError::Timeout(format!("waiting for '{}'", request.ready_selector)))
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

struct NoNetwork;

#[async_trait]
impl Fetcher for NoNetwork {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Err(IntelError::Timeout(url.to_string()))
    }
}

/// Scores by URL; articles with no entry get no verdict.
struct FakeScorer {
    scores: HashMap<&'static str, Option<f64>>,
    calls: AtomicUsize,
}

impl FakeScorer {
    fn new(scores: &[(&'static str, Option<f64>)]) -> Self {
        Self {
            scores: scores.iter().cloned().collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Scorer for FakeScorer {
    async fn score(&self, articles: &[Article]) -> Vec<Verdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        articles
            .iter()
            .filter_map(|a| {
                self.scores
                    .get(a.url.as_str())
                    .map(|score| Verdict::new(a.id.clone(), *score, format!("why {}", a.url)))
            })
            .collect()
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    digests: Mutex<Vec<RunStats>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, approved: &[Verdict], articles: &HashMap<String, Article>) -> usize {
        let mut messages = self.messages.lock().unwrap();
        let mut sent = 0;
        for verdict in approved {
            if let Some(article) = articles.get(&verdict.id) {
                messages.push(format_message(article, verdict));
                sent += 1;
            }
        }
        sent
    }

    async fn send_digest(&self, stats: &RunStats) -> bool {
        self.digests.lock().unwrap().push(*stats);
        true
    }
}

fn news_target() -> PageTarget {
    PageTarget {
        name: "news.test".to_string(),
        url: NEWS_URL.to_string(),
        item_selector: "article".to_string(),
        title_selector: "h2".to_string(),
        snippet_selector: "p".to_string(),
        ready_timeout_secs: 1,
        ..Default::default()
    }
}

fn renderer(pages: &[(&str, &str)]) -> Arc<FakeRenderer> {
    Arc::new(FakeRenderer {
        pages: pages
            .iter()
            .map(|(url, html)| (url.to_string(), html.to_string()))
            .collect(),
        ..Default::default()
    })
}

struct Harness {
    _dir: TempDir,
    pipeline: Pipeline,
    scorer: Arc<FakeScorer>,
    notifier: Arc<RecordingNotifier>,
}

fn harness(sources: Vec<Arc<dyn Source>>, scorer: FakeScorer, mode: ScoreMode) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let scorer = Arc::new(scorer);
    let notifier = Arc::new(RecordingNotifier::default());

    let pipeline = Pipeline {
        runner: ScraperRunner::with_workers(4),
        sources,
        history: HistoryStore::new(dir.path().join("data").join("history.json")),
        scorer: scorer.clone(),
        notifier: notifier.clone(),
        mode,
    };

    Harness {
        _dir: dir,
        pipeline,
        scorer,
        notifier,
    }
}

fn context(renderer: Arc<FakeRenderer>) -> ScrapeContext {
    ScrapeContext::new(renderer, Arc::new(NoNetwork))
}

fn read_history(path: &Path) -> History {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_filter_mode() {
    let h = harness(
        vec![Arc::new(PageSource::new(news_target()))],
        FakeScorer::new(&[(U1, Some(8.0)), (U2, Some(3.0))]),
        ScoreMode::Filter { min_score: 7 },
    );
    let renderer = renderer(&[(NEWS_URL, NEWS_PAGE)]);

    let stats = h.pipeline.run(context(renderer.clone())).await;

    assert_eq!(
        stats,
        RunStats {
            scraped: 2,
            approved: 1,
            sent: 1
        }
    );

    let messages = h.notifier.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0],
        format!("[8] Fintech startup opens Astana office\nwhy {}\n{}", U1, U1)
    );
    assert_eq!(*h.notifier.digests.lock().unwrap(), vec![stats]);
    assert_eq!(renderer.shutdowns.load(Ordering::SeqCst), 1);

    // Rejected articles are remembered too
    let history = read_history(h.pipeline.history.path());
    assert!(history.is_seen(U1));
    assert!(history.is_seen(U2));
    assert!(history.last_run.is_some());
}

#[tokio::test]
async fn test_second_run_skips_seen_urls() {
    let h = harness(
        vec![Arc::new(PageSource::new(news_target()))],
        FakeScorer::new(&[(U1, Some(8.0))]),
        ScoreMode::Filter { min_score: 7 },
    );

    h.pipeline.run(context(renderer(&[(NEWS_URL, NEWS_PAGE)]))).await;
    let first = read_history(h.pipeline.history.path());

    tokio::time::sleep(Duration::from_millis(5)).await;
    let stats = h.pipeline.run(context(renderer(&[(NEWS_URL, NEWS_PAGE)]))).await;

    assert_eq!(stats, RunStats::default());
    assert_eq!(h.notifier.messages.lock().unwrap().len(), 1);
    assert_eq!(h.notifier.digests.lock().unwrap().len(), 2);
    assert_eq!(h.scorer.calls.load(Ordering::SeqCst), 1);

    let second = read_history(h.pipeline.history.path());
    assert_eq!(second.scraped_urls, first.scraped_urls);
    assert!(second.last_run >= first.last_run);
}

#[tokio::test]
async fn test_zero_items_still_stamps_history_and_digest() {
    let h = harness(
        vec![Arc::new(PageSource::new(news_target()))],
        FakeScorer::new(&[]),
        ScoreMode::Filter { min_score: 7 },
    );

    // Renderer knows no pages, so the only source times out
    let stats = h.pipeline.run(context(renderer(&[]))).await;

    assert_eq!(stats, RunStats::default());
    assert_eq!(h.scorer.calls.load(Ordering::SeqCst), 0);
    assert!(h.notifier.messages.lock().unwrap().is_empty());
    assert_eq!(*h.notifier.digests.lock().unwrap(), vec![RunStats::default()]);

    let history = read_history(h.pipeline.history.path());
    assert!(history.scraped_urls.is_empty());
    assert!(history.last_run.is_some());
}

#[tokio::test]
async fn test_summarize_only_delivers_every_verdict() {
    let h = harness(
        vec![Arc::new(PageSource::new(news_target()))],
        FakeScorer::new(&[(U1, None), (U2, None)]),
        ScoreMode::SummarizeOnly,
    );

    let stats = h.pipeline.run(context(renderer(&[(NEWS_URL, NEWS_PAGE)]))).await;

    assert_eq!(stats.approved, 2);
    assert_eq!(stats.sent, 2);
    let messages = h.notifier.messages.lock().unwrap().clone();
    assert!(messages[0].starts_with("[-] Fintech startup opens Astana office\n"));
    assert!(messages[1].ends_with(U2));
}

#[tokio::test]
async fn test_broken_source_does_not_block_others() {
    let broken = PageTarget {
        name: "broken.test".to_string(),
        url: "https://broken.test/".to_string(),
        ..news_target()
    };
    let h = harness(
        vec![
            Arc::new(PageSource::new(broken)),
            Arc::new(PageSource::new(news_target())),
        ],
        FakeScorer::new(&[(U1, Some(9.0)), (U2, Some(9.0))]),
        ScoreMode::Filter { min_score: 7 },
    );

    let stats = h.pipeline.run(context(renderer(&[(NEWS_URL, NEWS_PAGE)]))).await;

    assert_eq!(
        stats,
        RunStats {
            scraped: 2,
            approved: 2,
            sent: 2
        }
    );
}

#[tokio::test]
async fn test_corrupted_history_is_reset() {
    let h = harness(
        vec![Arc::new(PageSource::new(news_target()))],
        FakeScorer::new(&[]),
        ScoreMode::Filter { min_score: 7 },
    );
    let path = h.pipeline.history.path().to_path_buf();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{\"scraped_urls\": [\"https://news.test/a1\"").unwrap();

    let stats = h.pipeline.run(context(renderer(&[(NEWS_URL, NEWS_PAGE)]))).await;

    assert_eq!(stats.scraped, 2);
    assert_eq!(stats.approved, 0);
    assert_eq!(read_history(&path).scraped_urls.len(), 2);
}
