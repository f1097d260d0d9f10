use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::{debug, error, info, warn};

use crate::app::{IntelError, Result};
use crate::domain::{Article, Verdict};
use crate::scorer::{ScoreMode, Scorer, ScorerConfig};

const SCORE_PROMPT: &str = "\
You are an expert startup ecosystem analyst curating news for a high-school \
student in Kazakhstan who is passionate about entrepreneurship and building startups.
Rate every article in the batch from 1 to 10 for how useful it is to a student \
entrepreneur in Kazakhstan, and explain in one sentence why it matters.

Respond EXCLUSIVELY with a JSON array matching this schema:
[
  {\"id\": \"article_id\", \"score\": 8, \"summary\": \"1-sentence reason this matters.\"}
]
";

const SUMMARY_PROMPT: &str = "\
You are an expert startup ecosystem analyst summarising articles for a high-school \
student in Kazakhstan who is passionate about entrepreneurship and building startups.
For every article in the batch, write a clear 1-sentence summary explaining why it \
might matter to a student entrepreneur in Kazakhstan.

Respond EXCLUSIVELY with a JSON array matching this schema:
[
  {\"id\": \"article_id\", \"summary\": \"1-sentence summary of why this matters.\"}
]
";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Scorer speaking the OpenAI-compatible chat-completions protocol.
pub struct LlmScorer {
    client: Client,
    config: ScorerConfig,
}

impl LlmScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self.config.mode() {
            ScoreMode::Filter { .. } => SCORE_PROMPT,
            ScoreMode::SummarizeOnly => SUMMARY_PROMPT,
        }
    }

    /// User message listing the batch: id, title and truncated body per article.
    pub fn batch_prompt(&self, batch: &[Article]) -> String {
        let mut text = String::from("Here are the articles to evaluate:\n");
        for (idx, article) in batch.iter().enumerate() {
            let _ = write!(
                text,
                "\n--- Article {} ---\nID: {}\nTitle: {}\nContent:\n{}\n",
                idx,
                article.id,
                article.title,
                article.content_snippet(self.config.content_truncate_chars)
            );
        }
        text
    }

    async fn score_batch(&self, batch: &[Article]) -> Result<Vec<Verdict>> {
        let prompt = self.batch_prompt(batch);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: self.system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.2,
        };

        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntelError::Llm(format!("status {}: {}", status, body)));
        }

        let reply: ChatResponse = response.json().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| IntelError::Llm("response has no message content".to_string()))?;

        parse_verdicts(&content).inspect_err(|_| debug!("Raw model reply: {}", content))
    }
}

#[async_trait]
impl Scorer for LlmScorer {
    async fn score(&self, articles: &[Article]) -> Vec<Verdict> {
        if articles.is_empty() {
            info!("No articles to analyse, skipping LLM call");
            return Vec::new();
        }
        if self.config.api_key.is_empty() {
            error!("LLM API key is not set, cannot analyse articles");
            return Vec::new();
        }

        let batch_size = self.config.batch_size.max(1);
        let batches: Vec<&[Article]> = articles.chunks(batch_size).collect();
        info!(
            "Processing {} articles in {} batch(es) of up to {}",
            articles.len(),
            batches.len(),
            batch_size
        );

        let mut verdicts = Vec::new();
        for (idx, batch) in batches.iter().enumerate() {
            let batch_num = idx + 1;
            match self.score_batch(batch).await {
                Ok(results) => {
                    info!("Batch {}: analysed {} articles", batch_num, results.len());
                    verdicts.extend(results);
                }
                Err(e) => error!("Batch {}: {}", batch_num, e),
            }

            if batch_num < batches.len() {
                tokio::time::sleep(self.config.batch_delay()).await;
            }
        }

        info!("LLM analysis complete: {}/{} articles", verdicts.len(), articles.len());
        verdicts
    }
}

/// Parse a model reply into verdicts. Markdown code fences and prose around
/// the array are tolerated; records that don't fit a verdict are skipped.
pub fn parse_verdicts(reply: &str) -> Result<Vec<Verdict>> {
    let trimmed = reply.trim();
    let records = match serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
        Ok(records) => records,
        Err(_) => {
            let start = trimmed.find('[');
            let end = trimmed.rfind(']');
            match (start, end) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str(&trimmed[start..=end])?
                }
                _ => {
                    return Err(IntelError::Llm(format!(
                        "reply is not a JSON array: {}",
                        trimmed.chars().take(80).collect::<String>()
                    )))
                }
            }
        }
    };

    let verdicts = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Verdict>(record) {
            Ok(verdict) => Some(verdict),
            Err(e) => {
                warn!("Skipping malformed verdict: {}", e);
                None
            }
        })
        .collect();
    Ok(verdicts)
}
