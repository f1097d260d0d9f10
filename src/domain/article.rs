use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex characters kept from the SHA-256 digest of the URL.
pub const ID_LEN: usize = 16;

/// One scraped item, keyed by its permalink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub source: String,
    pub url: String,
    pub title: String,
    pub raw_content: String,
    pub published_at: String,
}

impl Article {
    pub fn new(
        source: impl Into<String>,
        url: impl Into<String>,
        title: impl Into<String>,
        raw_content: impl Into<String>,
    ) -> Self {
        let url = url.into();
        Self {
            id: Self::derive_id(&url),
            source: source.into(),
            url,
            title: title.into(),
            raw_content: raw_content.into(),
            published_at: String::new(),
        }
    }

    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = published_at.into();
        self
    }

    /// Generate a deterministic ID from the article URL
    pub fn derive_id(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let mut id = hex::encode(hasher.finalize());
        id.truncate(ID_LEN);
        id
    }

    /// Body text capped at `max_chars` characters, for prompt building.
    pub fn content_snippet(&self, max_chars: usize) -> &str {
        match self.raw_content.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.raw_content[..idx],
            None => &self.raw_content,
        }
    }
}
