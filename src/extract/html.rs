// src/extract/html.rs
// =============================================================================
// This module extracts anchor hrefs from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, so broken markup still parses
//
// The hrefs are returned exactly as written in the page. Deciding which of
// them are worth following is the crawl engine's job.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

// Extracts every anchor href from HTML content, in document order
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='https://a.com'>A</a>"
//   result = ["/docs", "https://a.com"]
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    // "a[href]" means "all <a> tags that have an href attribute".
    // The selector is a constant, so it can only fail if we typo it here.
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

// Resolves a possibly-relative href against the page it was found on
//
// Examples:
//   base = "https://example.com/page/"
//   href = "/docs" -> Some("https://example.com/docs")
//   href = "../other" -> Some("https://example.com/other")
//   href = "#top" -> None (same page)
//   href = "mailto:x@y.com" -> None
pub fn resolve_href(base: &str, href: &str) -> Option<String> {
    if href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    // Already absolute? Leave it alone so the engine sees what the page wrote
    if Url::parse(href).is_ok() {
        return Some(href.to_string());
    }

    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}
