//! Identifier resolution
//!
//! Maps a relative path onto a content identifier under the root. The
//! mapping is plain concatenation; relative paths are not validated.

use std::sync::OnceLock;

use cidnav_core::{ContentId, RootCid};

use crate::error::{ConfigError, ResolveError};

/// Compose `root/relative`
pub fn resolve(root: &RootCid, relative: &str) -> ContentId {
    root.join(relative)
}

/// Resolves relative paths against a root that is set exactly once
#[derive(Debug)]
pub struct Resolver {
    root: OnceLock<RootCid>,
    entry_point: String,
}

impl Resolver {
    /// Create a resolver with no root yet
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self {
            root: OnceLock::new(),
            entry_point: entry_point.into(),
        }
    }

    /// Create a resolver with its root already set
    pub fn with_root(root: RootCid, entry_point: impl Into<String>) -> Self {
        Self {
            root: OnceLock::from(root),
            entry_point: entry_point.into(),
        }
    }

    /// Set the root; fails if one is already set
    pub fn set_root(&self, root: RootCid) -> Result<(), ConfigError> {
        self.root.set(root).map_err(|_| ConfigError::RootAlreadySet)
    }

    pub fn root(&self) -> Result<&RootCid, ResolveError> {
        self.root.get().ok_or(ResolveError::RootNotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.root.get().is_some()
    }

    pub fn resolve(&self, relative: &str) -> Result<ContentId, ResolveError> {
        Ok(resolve(self.root()?, relative))
    }

    /// The identifier of the root's default entry point
    pub fn entry_point(&self) -> Result<ContentId, ResolveError> {
        self.resolve(&self.entry_point)
    }
}
