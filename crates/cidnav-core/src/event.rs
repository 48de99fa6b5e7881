//! Node notifications and operational status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::peer::{PeerId, PeerRecord};

/// Notifications emitted by the network node
///
/// These are informational: they drive the activity log and the discovered
/// peer set. Connected-peer membership is always taken from a direct query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeEvent {
    /// A peer was reported by the discovery mechanism
    PeerDiscovered {
        record: PeerRecord,
        timestamp: DateTime<Utc>,
    },

    /// A connection to a peer was opened
    PeerConnected {
        peer: PeerId,
        timestamp: DateTime<Utc>,
    },

    /// A connection to a peer was closed
    PeerDisconnected {
        peer: PeerId,
        timestamp: DateTime<Utc>,
    },
}

impl NodeEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::PeerDiscovered { timestamp, .. } => *timestamp,
            Self::PeerConnected { timestamp, .. } => *timestamp,
            Self::PeerDisconnected { timestamp, .. } => *timestamp,
        }
    }

    /// Get the peer this event is about
    pub fn peer(&self) -> &PeerId {
        match self {
            Self::PeerDiscovered { record, .. } => &record.id,
            Self::PeerConnected { peer, .. } => peer,
            Self::PeerDisconnected { peer, .. } => peer,
        }
    }

    /// Create a peer discovered event
    pub fn discovered(record: PeerRecord) -> Self {
        Self::PeerDiscovered {
            record,
            timestamp: Utc::now(),
        }
    }

    /// Create a peer connected event
    pub fn connected(peer: PeerId) -> Self {
        Self::PeerConnected {
            peer,
            timestamp: Utc::now(),
        }
    }

    /// Create a peer disconnected event
    pub fn disconnected(peer: PeerId) -> Self {
        Self::PeerDisconnected {
            peer,
            timestamp: Utc::now(),
        }
    }
}

/// Operational status of the network node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeStatus {
    #[default]
    Starting,
    Started,
    Stopping,
    Stopped,
}

impl NodeStatus {
    /// Only a started node counts as online
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Started)
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Started => write!(f, "started"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}
