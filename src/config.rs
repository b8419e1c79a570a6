// src/config.rs
// =============================================================================
// Runtime configuration for a crawl run.
//
// Settings come from two places:
// 1. An optional JSON file (--config walker.json)
// 2. Command-line flags, which override whatever the file said
//
// Every field has a default, so an empty JSON object `{}` is a valid config.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Browser identification sent with every request.
/// Plenty of sites answer bare HTTP clients with a 403, so we look like Chrome.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36";

// Errors that can happen while loading or checking a config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("at least one URL scheme must be allowed")]
    NoSchemes,

    #[error("min_delay_ms ({min}) is larger than max_delay_ms ({max})")]
    DelayRange { min: u64, max: u64 },
}

/// All tunable settings of the walker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// URL schemes we are willing to fetch
    #[serde(default = "default_allowed_schemes")]
    pub allowed_schemes: Vec<String>,

    /// Hosts must end with this suffix (empty = any host)
    #[serde(default = "default_host_suffix")]
    pub host_suffix: String,

    /// Value of the User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Check TLS certificates (off by default)
    #[serde(default)]
    pub verify_tls: bool,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Lower bound of the pause after each page, in milliseconds
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound (exclusive) of the pause after each page, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Resolve relative hrefs against the page URL instead of ignoring them
    #[serde(default)]
    pub follow_relative: bool,

    /// Directory the CSV export is written into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_allowed_schemes() -> Vec<String> {
    vec!["http".to_string(), "https".to_string()]
}

fn default_host_suffix() -> String {
    ".com".to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    3000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("Scrape Results")
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: default_allowed_schemes(),
            host_suffix: default_host_suffix(),
            user_agent: default_user_agent(),
            verify_tls: false,
            timeout_secs: default_timeout_secs(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            follow_relative: false,
            output_dir: default_output_dir(),
        }
    }
}

impl WalkerConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks the settings that serde can't check for us
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_schemes.is_empty() {
            return Err(ConfigError::NoSchemes);
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::DelayRange {
                min: self.min_delay_ms,
                max: self.max_delay_ms,
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_browser_walker() {
        let config = WalkerConfig::default();
        assert_eq!(config.allowed_schemes, vec!["http", "https"]);
        assert_eq!(config.host_suffix, ".com");
        assert!(!config.verify_tls);
        assert_eq!(config.min_delay(), Duration::from_secs(1));
        assert_eq!(config.max_delay(), Duration::from_secs(3));
        assert_eq!(config.output_dir, PathBuf::from("Scrape Results"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: WalkerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, WalkerConfig::default());
    }

    #[test]
    fn test_partial_json_overrides_only_given_fields() {
        let config: WalkerConfig =
            serde_json::from_str(r#"{"host_suffix": ".org", "verify_tls": true}"#).unwrap();
        assert_eq!(config.host_suffix, ".org");
        assert!(config.verify_tls);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"min_delay_ms": 0, "max_delay_ms": 10}}"#).unwrap();

        let config = WalkerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.min_delay_ms, 0);
        assert_eq!(config.max_delay_ms, 10);
    }

    #[test]
    fn test_from_missing_file() {
        let err = WalkerConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_delay_range() {
        let config = WalkerConfig {
            min_delay_ms: 5000,
            max_delay_ms: 100,
            ..WalkerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DelayRange { min: 5000, max: 100 })
        ));
    }

    #[test]
    fn test_validate_rejects_no_schemes() {
        let config = WalkerConfig {
            allowed_schemes: vec![],
            ..WalkerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoSchemes)));
    }
}
