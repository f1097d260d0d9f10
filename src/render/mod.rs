//! Shared rendering context for DOM sources.
//!
//! A single browser is launched before the source fan-out and shut down
//! once every source has finished:
//!
//! ```text
//! launch → render(page₁) ∥ render(page₂) ∥ … → shutdown
//! ```
//!
//! Sources only see the [`Renderer`] trait, so tests substitute canned HTML.

mod chrome;
mod config;

pub use chrome::ChromeRenderer;
pub use config::RenderConfig;

use std::time::Duration;

use async_trait::async_trait;

use crate::app::{IntelError, Result};

/// One page to render and the signal that its content is ready.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub url: String,
    pub ready_selector: String,
    pub ready_timeout: Duration,
}

impl RenderRequest {
    pub fn new(url: impl Into<String>, ready_selector: impl Into<String>, ready_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            ready_selector: ready_selector.into(),
            ready_timeout,
        }
    }
}

/// Trait for page rendering implementations
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Navigate to the page, wait for the ready selector, return the rendered HTML.
    async fn render(&self, request: &RenderRequest) -> Result<String>;

    /// Release the underlying resources. Called once per run.
    async fn shutdown(&self) {}
}

/// Stand-in used when no browser could be launched; every render fails.
pub struct UnavailableRenderer {
    reason: String,
}

impl UnavailableRenderer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Renderer for UnavailableRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<String> {
        Err(IntelError::Browser(format!(
            "cannot render {}: {}",
            request.url, self.reason
        )))
    }
}
