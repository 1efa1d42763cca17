//! HTML extraction for a company homepage.
//!
//! Everything here is synchronous: `scraper::Html` is not `Send`, so the
//! client finishes its awaits before handing the body to [`parse_page`].

use std::collections::HashSet;
use std::sync::LazyLock;

use cprof_core::{truncate_chars, ScrapedPage};
use scraper::{ElementRef, Html, Selector};
use url::Url;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("valid selector"));
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").expect("valid selector"));
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));

/// Elements whose text never reaches the reader.
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extract a [`ScrapedPage`] from raw HTML.
///
/// `base_url` resolves relative links; `page_url` is recorded on the result.
/// Content is truncated to `content_char_limit` characters and links are
/// capped at `max_links`.
#[must_use]
pub fn parse_page(
    html: &str,
    page_url: &str,
    base_url: &Url,
    content_char_limit: usize,
    max_links: usize,
) -> ScrapedPage {
    let document = Html::parse_document(html);

    ScrapedPage {
        url: page_url.to_string(),
        title: extract_title(&document),
        meta_description: extract_meta_description(&document),
        h1_tags: extract_headings(&document, &H1),
        h2_tags: extract_headings(&document, &H2),
        outbound_links: extract_links(&document, base_url, max_links),
        content: truncate_chars(&extract_visible_text(&document), content_char_limit),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
}

/// `<meta name="description">`, falling back to `og:description`.
fn extract_meta_description(document: &Html) -> Option<String> {
    let mut og_description = None;
    for el in document.select(&META) {
        let content = el
            .value()
            .attr("content")
            .map(collapse_whitespace)
            .filter(|c| !c.is_empty());
        let Some(content) = content else { continue };

        let name = el.value().attr("name").unwrap_or_default();
        if name.eq_ignore_ascii_case("description") {
            return Some(content);
        }
        let property = el.value().attr("property").unwrap_or_default();
        if og_description.is_none() && property.eq_ignore_ascii_case("og:description") {
            og_description = Some(content);
        }
    }
    og_description
}

fn extract_headings(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|h| !h.is_empty())
        .collect()
}

/// Absolute `http(s)` link targets in document order, first occurrence kept.
fn extract_links(document: &Html, base_url: &Url, max_links: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in document.select(&ANCHOR) {
        if links.len() >= max_links {
            break;
        }
        let Some(href) = el.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }
        let Ok(mut resolved) = base_url.join(href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        resolved.set_fragment(None);
        let link = resolved.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }
    links
}

/// Body text with script-like elements removed and whitespace collapsed.
fn extract_visible_text(document: &Html) -> String {
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ElementRef::wrap(ancestor)
                .is_some_and(|el| INVISIBLE_ELEMENTS.contains(&el.value().name()))
        });
        if !hidden {
            parts.push(text);
        }
    }
    collapse_whitespace(&parts.join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
