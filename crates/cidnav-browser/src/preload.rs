//! Startup preloading into the node's block store

use std::sync::Arc;

use tracing::{debug, error, instrument};

use cidnav_core::ContentId;
use cidnav_logging::ActivityLog;

use crate::error::PreloadError;
use crate::fetcher::Fetcher;
use crate::node::NodeHandle;

/// Fetches content from the network and stores it locally
pub struct Preloader {
    node: NodeHandle,
    fetcher: Arc<Fetcher>,
    log: Arc<ActivityLog>,
}

impl Preloader {
    pub fn new(node: NodeHandle, fetcher: Arc<Fetcher>, log: Arc<ActivityLog>) -> Self {
        Self { node, fetcher, log }
    }

    /// Store the bytes of `cid` in the block store, returning their length
    ///
    /// Later fetches of `cid` return exactly the stored bytes.
    #[instrument(skip(self), fields(cid = %cid))]
    pub async fn preload(&self, cid: &ContentId) -> Result<usize, PreloadError> {
        let bytes = self.fetcher.fetch_remote(cid).await?;
        let size = bytes.len();
        self.node.blockstore().put(cid, bytes).await?;
        self.log
            .append(format!("Preloaded script with CID: {cid} into blockstore"));
        Ok(size)
    }

    /// Preload every target, returning how many succeeded
    ///
    /// Failures are reported to diagnostics only.
    pub async fn preload_all(&self, targets: &[ContentId]) -> usize {
        let mut stored = 0;
        for cid in targets {
            match self.preload(cid).await {
                Ok(size) => {
                    debug!(%cid, size, "Preloaded");
                    stored += 1;
                }
                Err(e) => error!(%cid, error = %e, "Error preloading content into block store"),
            }
        }
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bytes::Bytes;
    use cidnav_core::{
        Blockstore, ChunkStream, ContentNode, MemoryBlockstore, MockNode, NodeEvent, NodeStatus,
        PeerId, StorageError,
    };
    use tokio::sync::broadcast;

    use crate::config::FetchConfig;

    fn preloader(node: &Arc<MockNode>, log: &Arc<ActivityLog>) -> (Preloader, Arc<Fetcher>) {
        let handle: NodeHandle = node.clone();
        let fetcher = Arc::new(Fetcher::new(handle.clone(), FetchConfig::default()));
        (Preloader::new(handle, fetcher.clone(), log.clone()), fetcher)
    }

    #[tokio::test]
    async fn test_preload_round_trip() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        let log = Arc::new(ActivityLog::new());
        let cid = ContentId::new("bafy123/ep-uncum-auto-answer.user.js");
        let script = "// ==UserScript==\nconsole.log('hi');\n";
        node.insert_chunks(
            cid.clone(),
            vec![
                Bytes::copy_from_slice(&script.as_bytes()[..10]),
                Bytes::copy_from_slice(&script.as_bytes()[10..]),
            ],
        );

        let (preloader, fetcher) = preloader(&node, &log);
        let size = preloader.preload(&cid).await.unwrap();
        assert_eq!(size, script.len());

        let stored = node.memory_blockstore().get(&cid).await.unwrap().unwrap();
        assert_eq!(stored, Bytes::from(script));

        let bytes = fetcher.fetch_bytes(&cid).await.unwrap();
        assert_eq!(bytes, stored);
        assert_eq!(node.cat_count(&cid), 1);

        assert_eq!(
            log.count_matching(&format!("Preloaded script with CID: {cid} into blockstore")),
            1
        );
    }

    #[tokio::test]
    async fn test_preload_failure_is_silent() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        let log = Arc::new(ActivityLog::new());
        let present = ContentId::new("bafy123/present.js");
        node.insert_text(present.clone(), "ok");

        let (preloader, _) = preloader(&node, &log);
        let err = preloader
            .preload(&ContentId::new("bafy123/missing.js"))
            .await
            .unwrap_err();
        assert!(matches!(err, PreloadError::Fetch(_)));

        let stored = preloader
            .preload_all(&[ContentId::new("bafy123/missing.js"), present])
            .await;
        assert_eq!(stored, 1);
        assert_eq!(log.len(), 1);
        assert_eq!(node.memory_blockstore().len(), 1);
    }

    /// A node whose block store has almost no room
    struct CrampedNode {
        inner: MockNode,
        store: MemoryBlockstore,
    }

    impl ContentNode for CrampedNode {
        fn peer_id(&self) -> PeerId {
            self.inner.peer_id()
        }

        fn cat(&self, cid: &ContentId) -> ChunkStream {
            self.inner.cat(cid)
        }

        fn blockstore(&self) -> &dyn Blockstore {
            &self.store
        }

        fn status(&self) -> NodeStatus {
            self.inner.status()
        }

        fn connected_peers(&self) -> Vec<PeerId> {
            self.inner.connected_peers()
        }

        fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
            self.inner.subscribe()
        }
    }

    #[tokio::test]
    async fn test_store_failure() {
        let log = Arc::new(ActivityLog::new());
        let cid = ContentId::new("bafy123/big.js");
        let inner = MockNode::new("12D3KooWLocal");
        inner.insert_text(cid.clone(), "0123456789");
        let node: NodeHandle = Arc::new(CrampedNode {
            inner,
            store: MemoryBlockstore::with_capacity(4),
        });

        let fetcher = Arc::new(Fetcher::new(node.clone(), FetchConfig::default()));
        let preloader = Preloader::new(node, fetcher, log.clone());

        let err = preloader.preload(&cid).await.unwrap_err();
        assert!(matches!(err, PreloadError::Store(StorageError::CapacityExceeded)));
        assert!(log.is_empty());
    }
}
