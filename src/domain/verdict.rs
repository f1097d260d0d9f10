use serde::{Deserialize, Deserializer, Serialize};

/// Scorer output for one article, correlated back by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<f64>,
    #[serde(default)]
    pub summary: String,
}

impl Verdict {
    pub fn new(id: impl Into<String>, score: Option<f64>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            score,
            summary: summary.into(),
        }
    }
}

/// Counts reported in the end-of-run digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub scraped: usize,
    pub approved: usize,
    pub sent: usize,
}

/// Accepts `8`, `6.5` and `"8"`; anything else is treated as no score.
/// Fractions are kept so the approval threshold sees the model's value.
fn lenient_score<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let score = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(score.filter(|s| s.is_finite()))
}
