// src/crawl/policy.rs
// =============================================================================
// Decides whether a URL is something we are allowed to walk into.
//
// A URL is crawlable when:
// 1. It parses as a URL at all
// 2. Its scheme is on the allow-list (http/https by default)
// 3. Its host ends with the configured suffix (".com" by default)
//
// Anything else is skipped without a record: malformed hrefs are common
// and would only flood the results with noise.
// =============================================================================

use crate::config::WalkerConfig;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPolicy {
    schemes: Vec<String>,
    host_suffix: String,
}

impl UrlPolicy {
    pub fn new<I, S>(schemes: I, host_suffix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            schemes: schemes
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect(),
            // Url lowercases hosts, so compare against a lowercase suffix
            host_suffix: host_suffix.to_ascii_lowercase(),
        }
    }

    pub fn from_config(config: &WalkerConfig) -> Self {
        Self::new(&config.allowed_schemes, &config.host_suffix)
    }

    /// Pure check, never panics and never errors
    pub fn is_crawlable(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };

        if !self.schemes.iter().any(|s| s == parsed.scheme()) {
            return false;
        }

        match parsed.host_str() {
            Some(host) if !host.is_empty() => host.ends_with(&self.host_suffix),
            _ => false,
        }
    }
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::from_config(&WalkerConfig::default())
    }
}
