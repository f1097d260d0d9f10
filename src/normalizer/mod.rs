use feed_rs::model::Link;
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{IntelError, Result};
use crate::domain::Article;
use crate::sources::html::strip_markup;

/// Converts RSS 0.9x/1.0/2.0, Atom and JSON Feed documents into articles.
#[derive(Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, source: &str, body: &[u8]) -> Result<Vec<Article>> {
        let feed = parser::parse(body).map_err(|e| IntelError::FeedParse(e.to_string()))?;

        let articles = feed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let link = permalink(&entry.links)?;
                let title = entry
                    .title
                    .map(|t| decode_html_entities(t.content.trim()).to_string())
                    .filter(|t| !t.is_empty())?;

                let markup = entry
                    .content
                    .and_then(|c| c.body)
                    .filter(|b| !b.trim().is_empty())
                    .or_else(|| entry.summary.map(|s| s.content))
                    .unwrap_or_default();
                let body = strip_markup(&markup);

                let raw_content = if body.is_empty() {
                    title.clone()
                } else {
                    format!("{}. {}", title, body)
                };

                let published = entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_default();

                Some(Article::new(source, link, title, raw_content).with_published_at(published))
            })
            .collect();

        Ok(articles)
    }
}

/// The alternate link when present (Atom `rel="alternate"` or no `rel`),
/// otherwise the first link.
fn permalink(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.trim().to_string())
        .filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>The Astana Times</title>
    <item>
      <title>Kazakhstan launches AI fund &amp; accelerator</title>
      <link>https://astanatimes.com/2026/10/ai-fund/</link>
      <guid>https://astanatimes.com/?p=1</guid>
      <pubDate>Sun, 18 Oct 2026 06:00:00 GMT</pubDate>
      <description>Short teaser</description>
      <content:encoded><![CDATA[<p>The <strong>$100M</strong> fund targets early-stage teams.</p>]]></content:encoded>
    </item>
    <item>
      <title>Teaser only</title>
      <link>https://astanatimes.com/2026/10/teaser/</link>
      <description><![CDATA[<p>Summary <em>markup</em></p>]]></description>
    </item>
    <item>
      <title>No link</title>
    </item>
    <item>
      <link>https://astanatimes.com/2026/10/untitled/</link>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Hugging Face Blog</title>
  <entry>
    <title>Open models roundup</title>
    <link href="https://huggingface.co/blog/roundup"/>
    <id>roundup</id>
    <updated>2026-10-17T12:00:00Z</updated>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let articles = Normalizer::new()
            .normalize("astanatimes", RSS_SAMPLE.as_bytes())
            .unwrap();

        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.source, "astanatimes");
        assert_eq!(first.title, "Kazakhstan launches AI fund & accelerator");
        assert_eq!(first.url, "https://astanatimes.com/2026/10/ai-fund/");
        assert_eq!(
            first.raw_content,
            "Kazakhstan launches AI fund & accelerator. The $100M fund targets early-stage teams."
        );
        assert_eq!(first.published_at, "2026-10-18T06:00:00+00:00");

        let second = &articles[1];
        assert_eq!(second.raw_content, "Teaser only. Summary markup");
        assert!(second.published_at.is_empty());
    }

    #[test]
    fn test_parse_atom_without_body() {
        let articles = Normalizer::new()
            .normalize("hf_blog", ATOM_SAMPLE.as_bytes())
            .unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "https://huggingface.co/blog/roundup");
        assert_eq!(articles[0].raw_content, "Open models roundup");
        assert_eq!(articles[0].published_at, "2026-10-17T12:00:00+00:00");
    }

    #[test]
    fn test_atom_prefers_alternate_link() {
        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Blog</title>
  <entry>
    <title>Post one</title>
    <id>tag:blog.test,2026:1</id>
    <updated>2026-10-17T12:00:00Z</updated>
    <link rel="replies" type="application/atom+xml" href="https://blog.test/feeds/1/comments"/>
    <link rel="edit" type="application/atom+xml" href="https://blog.test/feeds/posts/1"/>
    <link rel="alternate" type="text/html" href="https://blog.test/2026/10/post-one.html"/>
  </entry>
  <entry>
    <title>Post two</title>
    <id>tag:blog.test,2026:2</id>
    <updated>2026-10-17T12:00:00Z</updated>
    <link rel="replies" href="https://blog.test/feeds/2/comments"/>
  </entry>
</feed>"#;
        let articles = Normalizer::new().normalize("blog", feed.as_bytes()).unwrap();

        assert_eq!(articles[0].url, "https://blog.test/2026/10/post-one.html");
        // Only a non-alternate link: fall back to it
        assert_eq!(articles[1].url, "https://blog.test/feeds/2/comments");
    }

    #[test]
    fn test_article_ids_follow_links() {
        let normalizer = Normalizer::new();
        let a = normalizer.normalize("x", RSS_SAMPLE.as_bytes()).unwrap();
        let b = normalizer.normalize("y", RSS_SAMPLE.as_bytes()).unwrap();
        assert_eq!(a[0].id, b[0].id);
        assert_eq!(a[0].id, Article::derive_id("https://astanatimes.com/2026/10/ai-fund/"));
    }

    #[test]
    fn test_malformed_feed_is_an_error() {
        let err = Normalizer::new()
            .normalize("broken", b"<html>not a feed")
            .unwrap_err();
        assert!(matches!(err, IntelError::FeedParse(_)));
    }
}
