//! Article scoring and summarization through an external language model.
//!
//! Articles go out in fixed-size batches, one request each, carrying only
//! `id`, `title` and a truncated body. The model answers with a JSON array
//! of [`Verdict`]s that are matched back to articles by `id`.

mod llm;

pub use llm::{parse_verdicts, LlmScorer};

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Article, Verdict};

/// Trait for scorer implementations
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Verdicts for whatever batches succeeded; failed batches contribute nothing.
    async fn score(&self, articles: &[Article]) -> Vec<Verdict>;
}

/// Whether low-scoring articles are dropped before delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    /// Keep verdicts scoring at least `min_score`
    Filter { min_score: u8 },
    /// Every verdict passes through as a summary
    SummarizeOnly,
}

impl ScoreMode {
    /// Verdicts that should be delivered, in scorer order.
    pub fn approve(&self, verdicts: Vec<Verdict>) -> Vec<Verdict> {
        match *self {
            ScoreMode::Filter { min_score } => verdicts
                .into_iter()
                .filter(|v| v.score.is_some_and(|s| s >= f64::from(min_score)))
                .collect(),
            ScoreMode::SummarizeOnly => verdicts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// OpenAI-compatible endpoint root (`/chat/completions` is appended)
    pub api_base: String,

    pub model: String,

    /// Bearer token; usually supplied through the environment
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Articles per request (default: 25)
    pub batch_size: usize,

    /// Pause between batches in milliseconds (default: 2000)
    pub batch_delay_ms: u64,

    /// Body characters sent per article (default: 800)
    pub content_truncate_chars: usize,

    /// Approval threshold; unset means summarize-only
    pub min_score: Option<u8>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: String::new(),
            batch_size: 25,
            batch_delay_ms: 2000,
            content_truncate_chars: 800,
            min_score: Some(7),
        }
    }
}

impl ScorerConfig {
    pub fn mode(&self) -> ScoreMode {
        match self.min_score {
            Some(min_score) => ScoreMode::Filter { min_score },
            None => ScoreMode::SummarizeOnly,
        }
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}
