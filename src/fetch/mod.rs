// src/fetch/mod.rs
// =============================================================================
// This module is the boundary between the walker and the network.
//
// The crawl engine never talks to reqwest directly. It only sees the
// `PageFetcher` trait, which means:
// - the real walker uses `HttpFetcher` (reqwest under the hood)
// - tests plug in an in-memory fetcher and never touch the network
//
// Submodules:
// - http: the reqwest-backed fetcher and its error categorization
// =============================================================================

mod http;

pub use http::{FetchError, HttpFetcher};

use async_trait::async_trait;

/// What a fetch returns when the server answered at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// HTTP status code (200, 404, ...)
    pub status: u16,
    /// Response body decoded as text
    pub body: String,
}

impl Page {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Only a plain 200 counts as content worth scanning
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Retrieves raw page content for a URL.
///
/// Implementations must be shareable across tasks because the controller
/// hands the fetcher to a spawned crawl task.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}
