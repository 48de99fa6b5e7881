//! Peer state tracking
//!
//! Discovered peers accumulate for the life of the process. The connected
//! list is never stored: it is read from the node on every refresh and
//! replaces what the surface showed before.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use cidnav_core::{
    ContentNode, DisplaySurface, NodeEvent, NodeStatus, PeerId, PeerRecord, StatusIndicator,
};
use cidnav_logging::ActivityLog;

/// Peer state at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSnapshot {
    pub status: NodeStatus,
    pub discovered_count: usize,
    pub connected: Vec<PeerId>,
}

impl PeerSnapshot {
    pub fn connected_count(&self) -> usize {
        self.connected.len()
    }

    pub fn indicator(&self) -> StatusIndicator {
        StatusIndicator::from(self.status)
    }
}

/// Tracks discovered peers and mirrors node state to the surface
pub struct PeerTracker {
    discovered: DashMap<PeerId, PeerRecord>,
    log: Arc<ActivityLog>,
}

impl PeerTracker {
    pub fn new(log: Arc<ActivityLog>) -> Self {
        Self {
            discovered: DashMap::new(),
            log,
        }
    }

    /// Record a discovered peer
    ///
    /// Rediscovery refreshes the stored record without growing the set.
    pub fn on_discovered(&self, record: PeerRecord) {
        let id = record.id.clone();
        let is_new = self.discovered.insert(id.clone(), record).is_none();
        debug!(peer = %id.short_id(), is_new, total = self.discovered.len(), "Peer discovered");
        self.log.append(format!("Discovered peer {id}"));
    }

    pub fn on_connected(&self, peer: &PeerId) {
        debug!(peer = %peer.short_id(), "Peer connected");
        self.log.append(format!("Connected to {peer}"));
    }

    pub fn on_disconnected(&self, peer: &PeerId) {
        debug!(peer = %peer.short_id(), "Peer disconnected");
        self.log.append(format!("Disconnected from {peer}"));
    }

    /// Route a node event to its handler
    pub fn dispatch(&self, event: NodeEvent) {
        match event {
            NodeEvent::PeerDiscovered { record, .. } => self.on_discovered(record),
            NodeEvent::PeerConnected { peer, .. } => self.on_connected(&peer),
            NodeEvent::PeerDisconnected { peer, .. } => self.on_disconnected(&peer),
        }
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    pub fn is_discovered(&self, peer: &PeerId) -> bool {
        self.discovered.contains_key(peer)
    }

    pub fn discovered(&self, peer: &PeerId) -> Option<PeerRecord> {
        self.discovered.get(peer).map(|record| record.value().clone())
    }

    /// Read the node's current state
    pub fn snapshot(&self, node: &dyn ContentNode) -> PeerSnapshot {
        PeerSnapshot {
            status: node.status(),
            discovered_count: self.discovered_count(),
            connected: node.connected_peers(),
        }
    }

    /// Write the current peer state to the surface
    pub fn refresh(&self, node: &dyn ContentNode, surface: &dyn DisplaySurface) -> PeerSnapshot {
        let snapshot = self.snapshot(node);
        surface.set_status(&snapshot.indicator());
        surface.set_connected_peers(&snapshot.connected);
        surface.set_discovered_count(snapshot.discovered_count);
        trace!(
            status = %snapshot.status,
            connected = snapshot.connected_count(),
            discovered = snapshot.discovered_count,
            "Refreshed peer state"
        );
        snapshot
    }
}
