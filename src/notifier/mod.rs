//! Delivery of approved articles and the end-of-run digest.

mod telegram;

pub use telegram::{NotifierConfig, TelegramNotifier};

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Article, RunStats, Verdict};

/// Trait for chat delivery implementations
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message per approved verdict; returns how many were delivered.
    async fn notify(&self, approved: &[Verdict], articles: &HashMap<String, Article>) -> usize;

    /// Send the end-of-run digest; returns whether it was delivered.
    async fn send_digest(&self, stats: &RunStats) -> bool;
}

/// Three lines: `[score] title`, summary, url.
pub fn format_message(article: &Article, verdict: &Verdict) -> String {
    let score = verdict
        .score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("[{}] {}\n{}\n{}", score, article.title, verdict.summary, article.url)
}

pub fn format_digest(stats: &RunStats) -> String {
    format!(
        "StartupIntel run complete\nScraped: {}\nApproved: {}\nSent: {}",
        stats.scraped, stats.approved, stats.sent
    )
}
