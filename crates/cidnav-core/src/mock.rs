//! In-memory collaborators for testing
//!
//! Provides a [`MockNode`] serving content from memory, a
//! [`RecordingSurface`] that remembers everything written to it, and a
//! [`MockClipboard`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cidnav_core::{ContentId, ContentNode, MockNode};
//!
//! let node = MockNode::new("12D3KooWLocal");
//! node.insert_text("bafy123/index.html", "<a href=\"page2.html\">Next</a>");
//!
//! let mut chunks = node.cat(&ContentId::new("bafy123/index.html"));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::blockstore::{Blockstore, MemoryBlockstore};
use crate::error::{ClipboardError, NodeError};
use crate::event::{NodeEvent, NodeStatus};
use crate::identifier::ContentId;
use crate::peer::PeerId;
use crate::traits::{ChunkStream, Clipboard, ContentNode, DisplaySurface};
use crate::view::{ContentView, StatusIndicator, Toast};

/// Content served by the mock node for one identifier
#[derive(Debug, Clone)]
enum MockEntry {
    Chunks(Vec<Bytes>),
    /// Yield the given chunks, then fail
    Broken { chunks: Vec<Bytes>, message: String },
}

/// A content node backed by memory
///
/// Unknown identifiers fail with a retrieval error, like a node that finds no
/// providers.
pub struct MockNode {
    peer_id: PeerId,
    content: DashMap<ContentId, MockEntry>,
    latency: DashMap<ContentId, Duration>,
    /// Number of upcoming `cat` calls that fail before content is served
    pending_failures: DashMap<ContentId, usize>,
    blockstore: MemoryBlockstore,
    status: Mutex<NodeStatus>,
    connected: Mutex<Vec<PeerId>>,
    event_tx: broadcast::Sender<NodeEvent>,
    cat_requests: Mutex<Vec<ContentId>>,
}

impl MockNode {
    /// Create a started node with no content and no peers
    pub fn new(peer_id: impl Into<PeerId>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            peer_id: peer_id.into(),
            content: DashMap::new(),
            latency: DashMap::new(),
            pending_failures: DashMap::new(),
            blockstore: MemoryBlockstore::new(),
            status: Mutex::new(NodeStatus::Started),
            connected: Mutex::new(Vec::new()),
            event_tx,
            cat_requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve `text` as a single chunk
    pub fn insert_text(&self, cid: impl Into<ContentId>, text: &str) {
        self.insert_chunks(cid, vec![Bytes::copy_from_slice(text.as_bytes())]);
    }

    /// Serve the given chunks in order
    pub fn insert_chunks(&self, cid: impl Into<ContentId>, chunks: Vec<Bytes>) {
        self.content.insert(cid.into(), MockEntry::Chunks(chunks));
    }

    /// Serve `chunks`, then end the stream with a retrieval error
    pub fn insert_broken(
        &self,
        cid: impl Into<ContentId>,
        chunks: Vec<Bytes>,
        message: impl Into<String>,
    ) {
        self.content.insert(
            cid.into(),
            MockEntry::Broken {
                chunks,
                message: message.into(),
            },
        );
    }

    /// Delay the first chunk of every fetch of `cid`
    pub fn set_latency(&self, cid: impl Into<ContentId>, delay: Duration) {
        self.latency.insert(cid.into(), delay);
    }

    /// Make the next `count` fetches of `cid` fail before serving content
    pub fn fail_next(&self, cid: impl Into<ContentId>, count: usize) {
        self.pending_failures.insert(cid.into(), count);
    }

    pub fn set_status(&self, status: NodeStatus) {
        *self.status.lock() = status;
    }

    pub fn set_connected(&self, peers: Vec<PeerId>) {
        *self.connected.lock() = peers;
    }

    /// Broadcast a node event, returning the number of receivers
    pub fn emit(&self, event: NodeEvent) -> usize {
        self.event_tx.send(event).unwrap_or(0)
    }

    /// Every identifier passed to `cat`, in call order
    pub fn cat_requests(&self) -> Vec<ContentId> {
        self.cat_requests.lock().clone()
    }

    /// How many times `cid` was fetched from the network
    pub fn cat_count(&self, cid: &ContentId) -> usize {
        self.cat_requests.lock().iter().filter(|c| *c == cid).count()
    }

    /// Direct access to the backing store
    pub fn memory_blockstore(&self) -> &MemoryBlockstore {
        &self.blockstore
    }

    fn take_failure(&self, cid: &ContentId) -> bool {
        match self.pending_failures.get_mut(cid) {
            Some(mut remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

impl ContentNode for MockNode {
    fn peer_id(&self) -> PeerId {
        self.peer_id.clone()
    }

    fn cat(&self, cid: &ContentId) -> ChunkStream {
        self.cat_requests.lock().push(cid.clone());

        let injected_failure = self.take_failure(cid);
        let entry = self.content.get(cid).map(|entry| entry.value().clone());
        let delay = self.latency.get(cid).map(|delay| *delay);
        let cid = cid.clone();

        Box::pin(async_stream::stream! {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            match entry {
                _ if injected_failure => {
                    yield Err(NodeError::retrieval(format!("transient failure for {cid}")));
                }
                None => {
                    yield Err(NodeError::retrieval(format!("no providers found for {cid}")));
                }
                Some(MockEntry::Chunks(chunks)) => {
                    for chunk in chunks {
                        yield Ok(chunk);
                    }
                }
                Some(MockEntry::Broken { chunks, message }) => {
                    for chunk in chunks {
                        yield Ok(chunk);
                    }
                    yield Err(NodeError::Retrieval(message));
                }
            }
        })
    }

    fn blockstore(&self) -> &dyn Blockstore {
        &self.blockstore
    }

    fn status(&self) -> NodeStatus {
        *self.status.lock()
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        self.connected.lock().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.event_tx.subscribe()
    }
}

/// Lifecycle phase of a toast on the recording surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Visible,
    Fading,
}

/// Everything a [`RecordingSurface`] has been told to show
#[derive(Debug, Clone, Default)]
pub struct SurfaceState {
    pub status: Option<StatusIndicator>,
    pub discovered_count: Option<usize>,
    pub connected_count: Option<usize>,
    pub connected: Vec<PeerId>,
    pub log: Vec<String>,
    pub node_id: Option<PeerId>,
    pub content: ContentView,
    /// Every view written to the content area, oldest first
    pub content_history: Vec<ContentView>,
    pub toasts: Vec<(Toast, ToastPhase)>,
}

/// A display surface that records writes for assertions
#[derive(Debug, Default)]
pub struct RecordingSurface {
    state: Mutex<SurfaceState>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SurfaceState {
        self.state.lock().clone()
    }

    /// The view currently in the content area
    pub fn content(&self) -> ContentView {
        self.state.lock().content.clone()
    }

    /// Log lines written so far
    pub fn log_lines(&self) -> Vec<String> {
        self.state.lock().log.clone()
    }
}

impl DisplaySurface for RecordingSurface {
    fn set_status(&self, status: &StatusIndicator) {
        self.state.lock().status = Some(status.clone());
    }

    fn set_discovered_count(&self, count: usize) {
        self.state.lock().discovered_count = Some(count);
    }

    fn set_connected_peers(&self, peers: &[PeerId]) {
        let mut state = self.state.lock();
        state.connected_count = Some(peers.len());
        state.connected = peers.to_vec();
    }

    fn append_log_line(&self, line: &str) {
        self.state.lock().log.push(line.to_string());
    }

    fn set_node_id(&self, id: &PeerId) {
        self.state.lock().node_id = Some(id.clone());
    }

    fn set_content(&self, view: ContentView) {
        let mut state = self.state.lock();
        state.content_history.push(view.clone());
        state.content = view;
    }

    fn show_toast(&self, toast: &Toast) {
        self.state
            .lock()
            .toasts
            .push((toast.clone(), ToastPhase::Visible));
    }

    fn fade_toast(&self, id: u64) {
        let mut state = self.state.lock();
        if let Some((_, phase)) = state.toasts.iter_mut().find(|(toast, _)| toast.id == id) {
            *phase = ToastPhase::Fading;
        }
    }

    fn remove_toast(&self, id: u64) {
        self.state.lock().toasts.retain(|(toast, _)| toast.id != id);
    }
}

/// A clipboard that remembers what was written
#[derive(Debug, Default)]
pub struct MockClipboard {
    writes: Mutex<Vec<String>>,
    deny: AtomicBool,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail
    pub fn deny_writes(&self, deny: bool) {
        self.deny.store(deny, Ordering::SeqCst);
    }

    /// The most recent successful write
    pub fn contents(&self) -> Option<String> {
        self.writes.lock().last().cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }
}

#[async_trait]
impl Clipboard for MockClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(ClipboardError::Denied("write not permitted".to_string()));
        }
        self.writes.lock().push(text.to_string());
        Ok(())
    }
}
