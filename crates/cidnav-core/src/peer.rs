//! Peer identity and discovery metadata

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a remote peer as reported by the network node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Wrap a raw peer identity
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get a short display form (for logging)
    pub fn short_id(&self) -> String {
        let tail: String = self.0.chars().rev().take(8).collect();
        tail.chars().rev().collect()
    }
}

impl Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// A discovered peer and whatever the discovery mechanism said about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    /// Peer identity
    pub id: PeerId,
    /// Advertised addresses
    pub addrs: Vec<String>,
    /// Free-form discovery metadata
    pub metadata: BTreeMap<String, String>,
    /// When the record was produced
    pub discovered_at: DateTime<Utc>,
}

impl PeerRecord {
    /// Create a new record with no addresses or metadata
    pub fn new(id: impl Into<PeerId>) -> Self {
        Self {
            id: id.into(),
            addrs: Vec::new(),
            metadata: BTreeMap::new(),
            discovered_at: Utc::now(),
        }
    }

    /// Add an advertised address
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addrs.push(addr.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_takes_tail() {
        let id = PeerId::new("12D3KooWAbCdEfGh12345678");
        assert_eq!(id.short_id(), "12345678");
        assert_eq!(PeerId::new("abc").short_id(), "abc");
    }

    #[test]
    fn test_record_builder() {
        let record = PeerRecord::new("peer-a")
            .with_addr("/ip4/10.0.0.1/tcp/4001")
            .with_metadata("agent", "helia");
        assert_eq!(record.id.as_str(), "peer-a");
        assert_eq!(record.addrs.len(), 1);
        assert_eq!(record.metadata.get("agent").map(String::as_str), Some("helia"));
    }
}
