//! # StartupIntel
//!
//! A scheduled news aggregator for a student startup audience in Kazakhstan.
//!
//! ## Architecture
//!
//! Each invocation performs one run:
//!
//! ```text
//! History → Sources (concurrent) → Scorer → Notifier → History
//! ```
//!
//! - [`sources`]: Telegram channels, HTML news pages, RSS/Atom feeds, Hacker News
//! - [`runner`]: Fans the sources out and merges their new articles
//! - [`scorer`]: Batched LLM scoring or summarization
//! - [`notifier`]: Telegram delivery and the end-of-run digest
//! - [`history`]: JSON record of every URL already handled
//!
//! ## Quick Start
//!
//! ```bash
//! export GEMINI_API_KEY=... TELEGRAM_BOT_TOKEN=... TELEGRAM_CHAT_ID=...
//! startupintel --history data/history.json
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration with environment overrides
//! - [`domain`]: Core domain models (Article, Verdict, RunStats)
//! - [`fetcher`]: Plain HTTP fetching
//! - [`render`]: Headless browser rendering
//! - [`normalizer`]: Feed parsing and normalization

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// sources, fetcher, scorer, notifier, history.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/startupintel/config.toml`, then overlays
/// credentials from the environment.
pub mod config;

/// Command-line interface using clap.
pub mod cli;

/// Core domain models.
///
/// - [`Article`](domain::Article): One scraped item with a URL-derived ID
/// - [`Verdict`](domain::Verdict): Scorer output for one article
/// - [`RunStats`](domain::RunStats): Counters reported in the digest
pub mod domain;

/// Duplicate prevention across runs.
pub mod history;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for byte fetching
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Headless Chrome rendering via chromiumoxide.
///
/// - [`Renderer`](render::Renderer): Async trait for rendering implementations
/// - [`ChromeRenderer`](render::ChromeRenderer): Shared browser, one page per request
/// - [`RenderConfig`](render::RenderConfig): Configuration options
pub mod render;

/// Feed parsing and normalization.
///
/// Converts RSS 0.9x/1.0/2.0, Atom 0.3/1.0, and JSON Feed 1.0
/// into [`Article`](domain::Article) structs.
pub mod normalizer;

/// Source adapters, one per origin family.
///
/// - [`Source`](sources::Source): Async trait with a soft-failing `fetch_new`
/// - [`PageSource`](sources::PageSource): Rendered HTML news pages
/// - [`TelegramSource`](sources::TelegramSource): Public channel previews
/// - [`FeedSource`](sources::FeedSource): RSS/Atom feeds
/// - [`HackerNewsSource`](sources::HackerNewsSource): Top stories over REST
pub mod sources;

/// Concurrent source execution with a worker semaphore.
pub mod runner;

/// Batched LLM scoring.
///
/// - [`Scorer`](scorer::Scorer): Async trait for scorer implementations
/// - [`LlmScorer`](scorer::LlmScorer): OpenAI-compatible chat-completions client
/// - [`ScoreMode`](scorer::ScoreMode): Threshold filter or summarize-only
pub mod scorer;

/// Chat delivery.
///
/// - [`Notifier`](notifier::Notifier): Async trait for delivery implementations
/// - [`TelegramNotifier`](notifier::TelegramNotifier): Bot API `sendMessage` client
pub mod notifier;

/// One end-to-end run.
pub mod pipeline;
