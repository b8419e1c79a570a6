// src/crawl/visited.rs
// =============================================================================
// The set of pages fetched successfully during one walk.
//
// A thin wrapper around HashSet so the crawl engine can only add to it.
// =============================================================================

use std::collections::HashSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Idempotent: marking a URL twice leaves one entry
    pub fn mark_visited(&mut self, url: &str) {
        if !self.urls.contains(url) {
            self.urls.insert(url.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Visited URLs, sorted so exports are stable between runs
    pub fn into_sorted_vec(self) -> Vec<String> {
        let mut urls: Vec<String> = self.urls.into_iter().collect();
        urls.sort();
        urls
    }
}
