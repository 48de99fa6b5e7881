//! Browser configuration
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! root_cid_path = "src/cid.txt"
//! entry_point = "index.html"
//! preload = ["ep-uncum-auto-answer.user.js"]
//! refresh_interval_ms = 500
//! markup_trust = "sanitize"
//!
//! [fetch]
//! max_attempts = 3
//! retry_delay_ms = 250
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cidnav_core::RootCid;

use crate::error::ConfigError;

/// How hypertext markup is treated before display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupTrust {
    /// Insert markup as-is, scripts included
    #[default]
    Trusted,
    /// Strip script elements and inline event handlers first
    Sanitize,
}

/// Fetch behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per fetch; 1 means no retry
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    /// Serve from the node's block store when it holds the identifier
    pub prefer_local_store: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            retry_delay_ms: 250,
            prefer_local_store: true,
        }
    }
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_prefer_local_store(mut self, prefer: bool) -> Self {
        self.prefer_local_store = prefer;
        self
    }
}

/// Copy confirmation toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    pub message: String,
    pub visible_ms: u64,
    pub fade_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            message: "Script Copied!".to_string(),
            visible_ms: 2_000,
            fade_ms: 500,
        }
    }
}

impl ToastConfig {
    pub fn visible_for(&self) -> Duration {
        Duration::from_millis(self.visible_ms)
    }

    pub fn fade_for(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

/// Configuration for a browser session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Plain-text file holding the root identifier
    pub root_cid_path: PathBuf,
    /// Relative path opened at startup and by "Return to Original Page"
    pub entry_point: String,
    /// Relative paths stored in the block store at startup
    pub preload: Vec<String>,
    pub refresh_interval_ms: u64,
    /// Identifier suffixes shown as raw text
    pub inspection_suffixes: Vec<String>,
    /// Href prefixes left alone by the link rewriter
    pub external_schemes: Vec<String>,
    pub markup_trust: MarkupTrust,
    pub fetch: FetchConfig,
    pub toast: ToastConfig,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            root_cid_path: PathBuf::from("src/cid.txt"),
            entry_point: "index.html".to_string(),
            preload: vec!["ep-uncum-auto-answer.user.js".to_string()],
            refresh_interval_ms: 500,
            inspection_suffixes: vec![".js".to_string(), ".log".to_string(), ".txt".to_string()],
            external_schemes: vec!["http://".to_string(), "https://".to_string()],
            markup_trust: MarkupTrust::default(),
            fetch: FetchConfig::default(),
            toast: ToastConfig::default(),
        }
    }
}

impl BrowserConfig {
    /// Parse a TOML document; missing fields take their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "refresh_interval_ms",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    /// Read and parse a TOML configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let config = Self::from_toml_str(&raw)?;
        debug!(path = %path.display(), "Loaded browser configuration");
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn with_root_cid_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_cid_path = path.into();
        self
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    pub fn with_preload(mut self, targets: Vec<String>) -> Self {
        self.preload = targets;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_inspection_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.inspection_suffixes = suffixes;
        self
    }

    pub fn with_external_schemes(mut self, schemes: Vec<String>) -> Self {
        self.external_schemes = schemes;
        self
    }

    pub fn with_markup_trust(mut self, trust: MarkupTrust) -> Self {
        self.markup_trust = trust;
        self
    }

    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn with_toast(mut self, toast: ToastConfig) -> Self {
        self.toast = toast;
        self
    }
}

/// Load the root identifier from its bootstrap file
///
/// The content is trimmed. A missing file, an unreadable file or blank
/// content is an error.
pub async fn load_root_cid(path: impl AsRef<Path>) -> Result<RootCid, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    RootCid::parse(&raw).ok_or_else(|| ConfigError::EmptyRoot(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrowserConfig::default();
        assert_eq!(config.root_cid_path, PathBuf::from("src/cid.txt"));
        assert_eq!(config.entry_point, "index.html");
        assert_eq!(config.preload, vec!["ep-uncum-auto-answer.user.js"]);
        assert_eq!(config.refresh_interval(), Duration::from_millis(500));
        assert_eq!(config.inspection_suffixes, vec![".js", ".log", ".txt"]);
        assert_eq!(config.markup_trust, MarkupTrust::Trusted);
        assert_eq!(config.fetch.max_attempts, 1);
        assert!(config.fetch.prefer_local_store);
        assert_eq!(config.toast.message, "Script Copied!");
        assert_eq!(config.toast.visible_for(), Duration::from_secs(2));
        assert_eq!(config.toast.fade_for(), Duration::from_millis(500));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = BrowserConfig::from_toml_str("").unwrap();
        assert_eq!(config, BrowserConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = BrowserConfig::from_toml_str(
            r#"
            entry_point = "home.html"
            markup_trust = "sanitize"

            [fetch]
            max_attempts = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.entry_point, "home.html");
        assert_eq!(config.markup_trust, MarkupTrust::Sanitize);
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.retry_delay_ms, 250);
        assert_eq!(config.refresh_interval_ms, 500);
    }

    #[test]
    fn test_invalid_toml() {
        let result = BrowserConfig::from_toml_str("markup_trust = \"maybe\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_refresh_interval_rejected() {
        let result = BrowserConfig::from_toml_str("refresh_interval_ms = 0");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "refresh_interval_ms",
                ..
            })
        ));

        let config = BrowserConfig::default().with_refresh_interval(Duration::ZERO);
        assert!(config.validate().is_err());
        assert!(BrowserConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = BrowserConfig::default()
            .with_entry_point("start.html")
            .with_preload(Vec::new())
            .with_refresh_interval(Duration::from_millis(100))
            .with_fetch(FetchConfig::default().with_max_attempts(2));

        assert_eq!(config.entry_point, "start.html");
        assert!(config.preload.is_empty());
        assert_eq!(config.refresh_interval_ms, 100);
        assert_eq!(config.fetch.max_attempts, 2);
    }

    #[tokio::test]
    async fn test_load_root_cid_trims() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cid.txt");
        std::fs::write(&path, "  bafyROOT\n").unwrap();

        let root = load_root_cid(&path).await.unwrap();
        assert_eq!(root.as_str(), "bafyROOT");
    }

    #[tokio::test]
    async fn test_load_root_cid_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cid.txt");
        std::fs::write(&path, " \n\t").unwrap();

        let result = load_root_cid(&path).await;
        assert!(matches!(result, Err(ConfigError::EmptyRoot(_))));
    }

    #[tokio::test]
    async fn test_load_root_cid_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = load_root_cid(dir.path().join("absent.txt")).await;
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[tokio::test]
    async fn test_load_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cidnav.toml");
        std::fs::write(&path, "refresh_interval_ms = 1000\n").unwrap();

        let config = BrowserConfig::load(&path).await.unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }
}
