//! Error types for the browser engine

use std::path::PathBuf;

use thiserror::Error;

use cidnav_core::{ClipboardError, ContentId, NodeError, StorageError};

/// Configuration errors; fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Root CID file {0} is empty")]
    EmptyRoot(PathBuf),

    #[error("Invalid configuration: {0}")]
    Parse(String),

    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Root CID already set")]
    RootAlreadySet,
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Resolution errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Root CID not loaded")]
    RootNotLoaded,
}

/// What went wrong while fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// Retrieval or resolution failed in the network node
    Network,
    /// The payload is not valid UTF-8
    Decode,
}

/// A failed fetch, carrying the original failure message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub cid: ContentId,
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    /// Create a network failure
    pub fn network(cid: &ContentId, message: impl Into<String>) -> Self {
        Self {
            cid: cid.clone(),
            kind: FetchErrorKind::Network,
            message: message.into(),
        }
    }

    /// Create a decode failure
    pub fn decode(cid: &ContentId, message: impl Into<String>) -> Self {
        Self {
            cid: cid.clone(),
            kind: FetchErrorKind::Decode,
            message: message.into(),
        }
    }
}

/// Preload failures; logged, never shown to the user
#[derive(Debug, Error)]
pub enum PreloadError {
    #[error("Preload fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Preload store failed: {0}")]
    Store(#[from] StorageError),
}

/// Top-level error type for the browser engine
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Preload error: {0}")]
    Preload(#[from] PreloadError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),
}

/// Result type alias for browser operations
pub type BrowserResult<T> = Result<T, BrowserError>;
