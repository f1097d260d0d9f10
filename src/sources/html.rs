//! Text helpers shared by the DOM and feed sources.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::app::{IntelError, Result};

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "tr",
    "section", "article", "header", "footer", "figcaption",
];

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| IntelError::Extraction(format!("invalid selector '{}': {}", css, e)))
}

/// Optional selectors are configured as possibly-empty strings.
pub fn optional_selector(css: &str) -> Result<Option<Selector>> {
    if css.trim().is_empty() {
        Ok(None)
    } else {
        selector(css).map(Some)
    }
}

/// Rendered-style text: whitespace runs collapse, `<br>` and block
/// elements start new lines, blank lines are squeezed.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();

    for node in element.descendants().skip(1) {
        match node.value() {
            Node::Text(text) => push_collapsed(&mut raw, text),
            Node::Element(el) if el.name() == "br" => raw.push('\n'),
            Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => {
                if !raw.is_empty() && !raw.ends_with('\n') {
                    raw.push('\n');
                }
            }
            _ => {}
        }
    }

    let mut lines: Vec<&str> = Vec::new();
    for line in raw.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// `inner_text` flattened onto one line.
pub fn line_text(element: ElementRef<'_>) -> String {
    inner_text(element)
        .lines()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty single-line text among the matches of `selector`.
pub fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .map(line_text)
        .find(|text| !text.is_empty())
}

/// Plain text of an HTML fragment, on one line.
pub fn strip_markup(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    line_text(html.root_element())
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn push_collapsed(out: &mut String, text: &str) {
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !out.ends_with(' ') && !out.ends_with('\n') {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
}
