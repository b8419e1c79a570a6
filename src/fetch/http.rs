// src/fetch/http.rs
// =============================================================================
// The real page fetcher, built on reqwest.
//
// Key functionality:
// - Sends a browser User-Agent with every request
// - Certificate verification can be switched off (it is off by default)
// - Turns reqwest's errors into a small set of readable categories
//
// The error text produced here is exactly what ends up in the
// "Error Code" column of the exported CSV.
// =============================================================================

use super::{Page, PageFetcher};
use crate::config::WalkerConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use thiserror::Error;

// Everything that can go wrong while fetching one page
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Request timed out
    #[error("request timed out")]
    Timeout,
    /// Could not resolve hostname
    #[error("could not resolve hostname: {0}")]
    Dns(String),
    /// Connection refused, reset, unreachable host...
    #[error("connection failed: {0}")]
    Connect(String),
    /// SSL/TLS handshake or certificate problem
    #[error("TLS error: {0}")]
    Tls(String),
    /// Redirect loop or too many redirects
    #[error("too many redirects")]
    Redirect,
    /// Response arrived but the body could not be read or decoded
    #[error("could not read response body: {0}")]
    Body(String),
    /// Anything else reqwest reports
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for FetchError {
    // Categorizes reqwest errors.
    //
    // reqwest doesn't expose DNS/TLS failures as separate kinds, so for those
    // we look at the text of the underlying causes. The top-level message
    // embeds the URL, so it is never searched: a page at /ssl-guide that
    // refuses the connection is still a connect failure.
    fn from(error: reqwest::Error) -> Self {
        let message = readable_message(&error);
        let causes = cause_text(&error);
        let mentions_tls = causes.contains("certificate") || causes.contains("tls") || causes.contains("ssl");

        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::Redirect
        } else if error.is_connect() {
            if mentions_tls {
                FetchError::Tls(message)
            } else if causes.contains("dns") || causes.contains("resolve") {
                FetchError::Dns(message)
            } else {
                FetchError::Connect(message)
            }
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(message)
        } else if mentions_tls {
            FetchError::Tls(message)
        } else {
            FetchError::Request(message)
        }
    }
}

// reqwest's Display usually carries its causes already, but not always.
// Append only the causes the message doesn't mention yet.
fn readable_message(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

// Lowercased text of the causes only, without the URL-bearing top level
fn cause_text(error: &dyn std::error::Error) -> String {
    let mut text = String::new();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(&cause.to_string().to_lowercase());
        text.push('\n');
        source = cause.source();
    }
    text
}

/// Page fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds the HTTP client from the walker settings
    pub fn new(config: &WalkerConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| FetchError::Request(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();

        // Non-200 bodies are never scanned, so don't bother downloading them
        if status != 200 {
            return Ok(Page {
                status,
                body: String::new(),
            });
        }

        Ok(Page::ok(response.text().await?))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why implement From<reqwest::Error>?
//    - The ? operator calls From::from on errors automatically
//    - So `self.client.get(url).send().await?` yields a FetchError for free
//
// 2. What is danger_accept_invalid_certs?
//    - Skips certificate checks (expired, self-signed, wrong host...)
//    - We want page content, not a security guarantee, so it's off by default
//    - --verify-tls turns checking back on
// -----------------------------------------------------------------------------
