// src/extract/mod.rs
// =============================================================================
// This module turns raw page content into things the walker cares about.
//
// Submodules:
// - html: pulls anchor hrefs out of an HTML page
// - keywords: parses the keyword list and finds keywords in page text
// =============================================================================

mod html;
mod keywords;

pub use html::{extract_hrefs, resolve_href};
pub use keywords::{find_keywords, KeywordSet};
