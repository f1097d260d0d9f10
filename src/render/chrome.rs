use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::{IntelError, Result};
use crate::render::config::RenderConfig;
use crate::render::{RenderRequest, Renderer};

/// Headless Chrome shared by every DOM source in a run.
pub struct ChromeRenderer {
    browser: RwLock<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    config: RenderConfig,
}

impl ChromeRenderer {
    /// Launch the browser with the given configuration
    pub async fn launch(config: RenderConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer");

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| IntelError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            IntelError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        Ok(Self {
            browser: RwLock::new(Some(browser)),
            handler: Mutex::new(Some(handler)),
            config,
        })
    }

    async fn open_page(&self, url: &str) -> Result<Page> {
        let guard = self.browser.read().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| IntelError::Browser("Browser already closed".to_string()))?;

        tokio::time::timeout(self.config.timeout(), browser.new_page(url))
            .await
            .map_err(|_| IntelError::Timeout(format!("opening {}", url)))?
            .map_err(|e| IntelError::Browser(format!("Failed to create page: {}", e)))
    }

    async fn set_user_agent(&self, page: &Page) -> Result<()> {
        if let Some(ref ua) = self.config.user_agent {
            tokio::time::timeout(self.config.timeout(), page.set_user_agent(ua))
                .await
                .map_err(|_| IntelError::Timeout("setting user agent".to_string()))?
                .map_err(|e| IntelError::Browser(format!("Failed to set user agent: {}", e)))?;
        }
        Ok(())
    }

    async fn wait_for_selector(&self, page: &Page, selector: &str) -> Result<()> {
        loop {
            if page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    async fn capture(&self, page: &Page, request: &RenderRequest) -> Result<String> {
        tokio::time::timeout(self.config.timeout(), page.wait_for_navigation())
            .await
            .map_err(|_| IntelError::Timeout(format!("navigation to {}", request.url)))?
            .map_err(|e| IntelError::Browser(format!("Navigation failed: {}", e)))?;

        tokio::time::timeout(
            request.ready_timeout,
            self.wait_for_selector(page, &request.ready_selector),
        )
        .await
        .map_err(|_| {
            IntelError::Timeout(format!(
                "waiting for '{}' on {}",
                request.ready_selector, request.url
            ))
        })??;

        page.content()
            .await
            .map_err(|e| IntelError::Browser(format!("Failed to read page content: {}", e)))
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<String> {
        let page = self.open_page(&request.url).await?;

        // From here on the page is always closed, whatever fails
        let result = match self.set_user_agent(&page).await {
            Ok(()) => self.capture(&page, request).await,
            Err(e) => Err(e),
        };

        if let Err(e) = page.close().await {
            debug!("Failed to close page for {}: {}", request.url, e);
        }

        result
    }

    async fn shutdown(&self) {
        if let Some(mut browser) = self.browser.write().await.take() {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Failed to wait for browser exit: {}", e);
            }
        }

        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }
    }
}
