//! Duplicate-prevention state persisted between runs.
//!
//! The file is a small JSON document:
//!
//! ```json
//! {
//!   "scraped_urls": ["https://t.me/astanahub/1", "https://er10.kz/news/a"],
//!   "last_run": "2026-10-19T09:00:00+05:00"
//! }
//! ```
//!
//! Loading never fails: a missing or unparsable file yields an empty
//! skeleton. JSON validity is the integrity boundary, so saves go through a
//! temporary file that is renamed over the target.

use std::collections::{BTreeSet, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::app::Result;

/// Offset used when stamping `last_run` (Astana, UTC+5).
pub const RUN_OFFSET_SECS: i32 = 5 * 3600;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct History {
    pub scraped_urls: BTreeSet<String>,
    #[serde(deserialize_with = "lenient_last_run")]
    pub last_run: Option<DateTime<FixedOffset>>,
}

impl History {
    /// Add a batch of URLs to the tracked set.
    pub fn mark_seen<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scraped_urls.extend(urls.into_iter().map(Into::into));
    }

    pub fn is_seen(&self, url: &str) -> bool {
        self.scraped_urls.contains(url)
    }

    /// Read-only snapshot handed to every source for one run.
    pub fn snapshot(&self) -> SeenSet {
        SeenSet(self.scraped_urls.iter().cloned().collect())
    }
}

/// URLs known before the current run started.
#[derive(Debug, Clone, Default)]
pub struct SeenSet(HashSet<String>);

impl SeenSet {
    pub fn contains(&self, url: &str) -> bool {
        self.0.contains(url)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> History {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("{} not found, starting fresh", self.path.display());
                return History::default();
            }
            Err(e) => {
                warn!("Unreadable history at {}, resetting: {}", self.path.display(), e);
                return History::default();
            }
        };

        match serde_json::from_str::<History>(&raw) {
            Ok(history) => history,
            Err(e) => {
                warn!("Corrupted history at {}, resetting: {}", self.path.display(), e);
                History::default()
            }
        }
    }

    /// Stamp `last_run` and persist.
    pub fn save(&self, history: &mut History) -> Result<()> {
        history.last_run = Some(Utc::now().with_timezone(&run_offset()));

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(history)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        info!(
            "History saved to {} ({} URLs tracked)",
            self.path.display(),
            history.scraped_urls.len()
        );
        Ok(())
    }
}

fn run_offset() -> FixedOffset {
    FixedOffset::east_opt(RUN_OFFSET_SECS).expect("UTC+5 is a valid offset")
}

/// RFC 3339, or an offset-less ISO-8601 time read as UTC+5. Anything else
/// becomes `None` so a bad timestamp never costs the URL set.
fn lenient_last_run<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let Some(raw) = raw.as_str().map(str::trim) else {
        warn!("Ignoring non-string last_run: {}", raw);
        return Ok(None);
    };

    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(stamp));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"));
    match naive {
        Ok(naive) => Ok(run_offset().from_local_datetime(&naive).single()),
        Err(_) => {
            warn!("Ignoring unparsable last_run {:?}", raw);
            Ok(None)
        }
    }
}
