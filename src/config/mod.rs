//! Configuration management for StartupIntel.
//!
//! Configuration is read from `~/.config/startupintel/config.toml` (or the
//! path given with `--config`). Every section is optional; missing fields use
//! the built-in defaults, which reproduce the production target set.
//! Credentials are normally supplied through the environment.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::fetcher::http_fetcher::HttpConfig;
use crate::notifier::NotifierConfig;
use crate::render::RenderConfig;
use crate::scorer::ScorerConfig;
use crate::sources::SourcesConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON file holding previously delivered URLs
    pub history_path: PathBuf,
    pub browser: RenderConfig,
    pub http: HttpConfig,
    pub sources: SourcesConfig,
    pub scorer: ScorerConfig,
    pub notifier: NotifierConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from("data/history.json"),
            browser: RenderConfig::default(),
            http: HttpConfig::default(),
            sources: SourcesConfig::default(),
            scorer: ScorerConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration, then overlay environment variables.
    ///
    /// An explicit path must exist and parse. Without one, the default path
    /// is used when present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Ok(path) if path.exists() => Self::from_file(&path)?,
                Ok(path) => {
                    debug!("No config at {}, using defaults", path.display());
                    Self::default()
                }
                Err(e) => {
                    warn!("{}, using defaults", e);
                    Self::default()
                }
            },
        };

        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/startupintel/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("startupintel").join("config.toml"))
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay credentials and the score threshold from `lookup`.
    /// Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("LLM_API_KEY").or_else(|| get("GEMINI_API_KEY")) {
            self.scorer.api_key = key;
        }
        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.notifier.bot_token = token;
        }
        if let Some(chat_id) = get("TELEGRAM_CHAT_ID") {
            self.notifier.chat_id = chat_id;
        }
        if let Some(raw) = get("STARTUPINTEL_MIN_SCORE") {
            match raw.trim() {
                "none" | "off" => self.scorer.min_score = None,
                value => match value.parse::<u8>() {
                    Ok(score) => self.scorer.min_score = Some(score),
                    Err(_) => warn!("Ignoring invalid STARTUPINTEL_MIN_SCORE={:?}", raw),
                },
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
