//! Capability traits at the engine's boundaries
//!
//! - [`ContentNode`]: the external content network node
//! - [`DisplaySurface`]: named display regions
//! - [`Clipboard`]: clipboard write access

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use tokio::sync::broadcast;

use crate::blockstore::Blockstore;
use crate::error::{ClipboardError, NodeError};
use crate::event::{NodeEvent, NodeStatus};
use crate::identifier::ContentId;
use crate::peer::PeerId;
use crate::view::{ContentView, StatusIndicator, Toast};

/// Lazy, finite, non-restartable sequence of content chunks
pub type ChunkStream = BoxStream<'static, Result<Bytes, NodeError>>;

/// The content network node consumed by the engine
///
/// Implementations wrap a real peer-to-peer library. The engine only relies
/// on the operations below and never reaches past them.
pub trait ContentNode: Send + Sync {
    /// Our own peer identity
    fn peer_id(&self) -> PeerId;

    /// Retrieve the content at `cid` as a stream of chunks
    ///
    /// Chunks are yielded in content order. A failure part way through ends
    /// the stream with an error item.
    fn cat(&self, cid: &ContentId) -> ChunkStream;

    /// The node's local block store
    fn blockstore(&self) -> &dyn Blockstore;

    /// Current operational status
    fn status(&self) -> NodeStatus;

    /// Peers currently connected, as known to the node right now
    fn connected_peers(&self) -> Vec<PeerId>;

    /// Subscribe to discovery and connection notifications
    fn subscribe(&self) -> broadcast::Receiver<NodeEvent>;
}

/// The display regions the engine writes to
///
/// Methods take `&self`; implementations use interior mutability. Every call
/// replaces the region's previous contents except [`append_log_line`].
///
/// [`append_log_line`]: DisplaySurface::append_log_line
pub trait DisplaySurface: Send + Sync {
    fn set_status(&self, status: &StatusIndicator);

    fn set_discovered_count(&self, count: usize);

    /// Replace the connected-peer list (and its count)
    fn set_connected_peers(&self, peers: &[PeerId]);

    fn append_log_line(&self, line: &str);

    fn set_node_id(&self, id: &PeerId);

    fn set_content(&self, view: ContentView);

    fn show_toast(&self, toast: &Toast);

    fn fade_toast(&self, id: u64);

    fn remove_toast(&self, id: u64);
}

/// Scoped clipboard write access
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}
