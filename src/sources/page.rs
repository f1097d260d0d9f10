use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::app::{IntelError, Result};
use crate::domain::Article;
use crate::render::RenderRequest;
use crate::sources::html::{first_text, line_text, optional_selector, selector, truncate_chars};
use crate::sources::{ScrapeContext, Source};

/// One HTML news page scraped through the shared browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageTarget {
    /// Tag used for `Article::source` and log lines
    pub name: String,

    /// Listing page to render
    pub url: String,

    /// Selector whose presence means the feed has rendered
    pub ready_selector: String,

    /// Repeating item containers; a container may itself be the link
    pub item_selector: String,

    /// Headline candidates inside a container, first non-empty wins
    pub title_selector: String,

    /// Snippet candidates inside a container, first non-empty wins
    pub snippet_selector: String,

    /// Best-effort date element (`datetime` attribute preferred)
    pub date_selector: String,

    /// Resolved links to ignore (listing pages, feeds)
    pub exclude: Vec<String>,

    /// Seconds to wait for `ready_selector`
    pub ready_timeout_secs: u64,

    /// Fallback title length when no heading is found
    pub title_max_chars: usize,
}

impl Default for PageTarget {
    fn default() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            ready_selector: "article".to_string(),
            item_selector: "article".to_string(),
            title_selector: "h1, h2, h3, h4, .title".to_string(),
            snippet_selector: "p, .excerpt, .description".to_string(),
            date_selector: String::new(),
            exclude: Vec::new(),
            ready_timeout_secs: 15,
            title_max_chars: 120,
        }
    }
}

impl PageTarget {
    pub fn digitalbusiness() -> Self {
        Self {
            name: "digitalbusiness.kz".to_string(),
            url: "https://digitalbusiness.kz".to_string(),
            ready_selector: "article, .post-item, .news-item".to_string(),
            item_selector: "article a[href], .post-item a[href], .news-item a[href]".to_string(),
            ..Default::default()
        }
    }

    pub fn er10() -> Self {
        Self {
            name: "er10.kz".to_string(),
            url: "https://er10.kz".to_string(),
            ready_selector: "article, .post, .news-card, .item, a[href*='/news/']".to_string(),
            item_selector: "article, .post, .news-card, .item".to_string(),
            title_selector: "h1, h2, h3, h4, .title, .headline".to_string(),
            snippet_selector: "p, .excerpt, .desc, .summary".to_string(),
            date_selector: "time, .date, .published".to_string(),
            ..Default::default()
        }
    }

    pub fn opentools() -> Self {
        Self {
            name: "opentools.ai".to_string(),
            url: "https://opentools.ai/news".to_string(),
            ready_selector: "a[href*='/news/']".to_string(),
            item_selector: "a[href*='/news/']".to_string(),
            title_selector: "h1, h2, h3, h4, .title, span".to_string(),
            snippet_selector: "p, .description, .excerpt, .summary".to_string(),
            exclude: vec!["https://opentools.ai/news".to_string()],
            ready_timeout_secs: 20,
            title_max_chars: 150,
            ..Default::default()
        }
    }

    pub fn presets() -> Vec<Self> {
        vec![Self::digitalbusiness(), Self::er10(), Self::opentools()]
    }
}

/// DOM source for a generic news listing page.
pub struct PageSource {
    target: PageTarget,
}

impl PageSource {
    pub fn new(target: PageTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &PageTarget {
        &self.target
    }

    /// Pull articles out of the rendered listing page.
    pub fn extract(&self, html: &str) -> Result<Vec<Article>> {
        let t = &self.target;
        let base = Url::parse(&t.url)?;
        let domain = base
            .host_str()
            .map(|h| h.trim_start_matches("www.").to_string())
            .ok_or_else(|| IntelError::Extraction(format!("target has no host: {}", t.url)))?;

        let items = selector(&t.item_selector)?;
        let link = selector("a[href]")?;
        let title = optional_selector(&t.title_selector)?;
        let snippet = optional_selector(&t.snippet_selector)?;
        let date = optional_selector(&t.date_selector)?;

        let document = Html::parse_document(html);
        let mut seen_links = HashSet::new();
        let mut articles = Vec::new();

        for container in document.select(&items) {
            let Some(anchor) = primary_link(container, &link) else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_link(&base, &domain, href) else {
                continue;
            };
            if t.exclude.iter().any(|e| e.trim_end_matches('/') == url.trim_end_matches('/')) {
                continue;
            }
            if !seen_links.insert(url.clone()) {
                continue;
            }

            let headline = title
                .as_ref()
                .and_then(|sel| first_text(container, sel))
                .unwrap_or_else(|| truncate_chars(&line_text(container), t.title_max_chars));
            if headline.is_empty() {
                continue;
            }

            let body = snippet
                .as_ref()
                .and_then(|sel| first_text(container, sel))
                .unwrap_or_default();
            let raw_content = if body.is_empty() {
                headline.clone()
            } else {
                format!("{}. {}", headline, body)
            };

            let published = date
                .as_ref()
                .and_then(|sel| container.select(sel).next())
                .map(|el| match el.value().attr("datetime") {
                    Some(dt) if !dt.trim().is_empty() => dt.trim().to_string(),
                    _ => line_text(el),
                })
                .unwrap_or_default();

            articles.push(
                Article::new(&t.name, url, headline, raw_content).with_published_at(published),
            );
        }

        Ok(articles)
    }
}

#[async_trait]
impl Source for PageSource {
    fn source_name(&self) -> &str {
        &self.target.name
    }

    async fn fetch_raw(&self, ctx: &ScrapeContext) -> Result<Vec<Article>> {
        info!("[{}] Navigating to {}", self.target.name, self.target.url);
        let request = RenderRequest::new(
            &self.target.url,
            &self.target.ready_selector,
            Duration::from_secs(self.target.ready_timeout_secs),
        );
        let html = ctx.renderer.render(&request).await?;

        let articles = self.extract(&html)?;
        info!("[{}] Parsed {} article links", self.target.name, articles.len());
        Ok(articles)
    }
}

fn primary_link<'a>(container: ElementRef<'a>, link: &scraper::Selector) -> Option<ElementRef<'a>> {
    if container.value().name() == "a" && container.value().attr("href").is_some() {
        Some(container)
    } else {
        container.select(link).next()
    }
}

/// Absolute http(s) URL on the target's own domain, or `None`.
fn resolve_link(base: &Url, domain: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?;
    let host = host.trim_start_matches("www.");
    if host == domain || host.ends_with(&format!(".{}", domain)) {
        Some(url.to_string())
    } else {
        None
    }
}
