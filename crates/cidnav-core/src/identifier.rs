//! Content identifiers
//!
//! A [`ContentId`] is an opaque address inside the content-addressed network.
//! Nested items are located by joining a [`RootCid`] with a relative path.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Opaque identifier of a content item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Wrap a raw identifier string
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the identifier ends with `suffix` (case-sensitive)
    pub fn has_suffix(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix)
    }

    /// Consume and return the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ContentId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Root identifier that every relative path is resolved against
///
/// Surrounding whitespace is trimmed on construction; an empty root is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootCid(String);

impl RootCid {
    /// Parse a root identifier, trimming surrounding whitespace
    ///
    /// Returns `None` when nothing but whitespace remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Get the root as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join a relative path onto the root: `root + "/" + relative`
    ///
    /// The relative path is not validated; any string is accepted.
    pub fn join(&self, relative: &str) -> ContentId {
        ContentId(format!("{}/{}", self.0, relative))
    }
}

impl Display for RootCid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_trimmed() {
        let root = RootCid::parse("  bafy123\n").unwrap();
        assert_eq!(root.as_str(), "bafy123");
    }

    #[test]
    fn test_blank_root_rejected() {
        assert!(RootCid::parse("").is_none());
        assert!(RootCid::parse(" \t\r\n").is_none());
    }

    #[test]
    fn test_join_is_plain_concatenation() {
        let root = RootCid::parse("bafy123").unwrap();
        assert_eq!(root.join("index.html").as_str(), "bafy123/index.html");
        assert_eq!(root.join("").as_str(), "bafy123/");
        assert_eq!(root.join("../x?y#z").as_str(), "bafy123/../x?y#z");
        assert_eq!(root.join("/abs").as_str(), "bafy123//abs");
    }

    #[test]
    fn test_join_is_deterministic_and_injective_on_path() {
        let root = RootCid::parse("bafy123").unwrap();
        assert_eq!(root.join("a.html"), root.join("a.html"));
        assert_ne!(root.join("a.html"), root.join("b.html"));
    }

    #[test]
    fn test_suffix_is_case_sensitive() {
        let cid = ContentId::new("bafy123/script.user.js");
        assert!(cid.has_suffix(".js"));
        assert!(!cid.has_suffix(".JS"));
    }
}
