//! Error types for the node, storage and clipboard collaborators

use thiserror::Error;

/// Errors raised by a content network node
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("Node creation failed: {0}")]
    Create(String),

    #[error("Content retrieval failed: {0}")]
    Retrieval(String),

    #[error("Node is not running")]
    Closed,
}

impl NodeError {
    /// Create a new retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Create a new creation error
    pub fn create(message: impl Into<String>) -> Self {
        Self::Create(message.into())
    }
}

/// Errors raised by a block store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Block not found: {0}")]
    NotFound(String),

    #[error("Block store capacity exceeded")]
    CapacityExceeded,

    #[error("Storage I/O error: {0}")]
    Io(String),
}

/// Errors raised by the clipboard
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("Clipboard unavailable")]
    Unavailable,

    #[error("Clipboard write denied: {0}")]
    Denied(String),
}
