//! Content fetching
//!
//! Pulls a node's chunk stream, concatenates the chunks in arrival order and
//! decodes the result as UTF-8 once the stream is complete, so multi-byte
//! sequences split across chunk boundaries decode correctly.

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tracing::{debug, instrument, trace, warn};

use cidnav_core::ContentId;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::node::NodeHandle;

/// Where fetched bytes came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Network,
    LocalStore,
}

/// A decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub cid: ContentId,
    pub text: String,
    /// Payload length in bytes
    pub size: usize,
    pub source: FetchSource,
}

/// Fetches content through the node
pub struct Fetcher {
    node: NodeHandle,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(node: NodeHandle, config: FetchConfig) -> Self {
        Self { node, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch `cid` and decode it as text
    #[instrument(skip(self), fields(cid = %cid))]
    pub async fn fetch(&self, cid: &ContentId) -> Result<Fetched, FetchError> {
        let (bytes, source) = self.fetch_with_source(cid).await?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| FetchError::decode(cid, e.to_string()))?
            .to_owned();

        debug!(size = bytes.len(), ?source, "Fetched content");
        Ok(Fetched {
            cid: cid.clone(),
            text,
            size: bytes.len(),
            source,
        })
    }

    /// Fetch the raw bytes of `cid`, from the block store when preferred
    pub async fn fetch_bytes(&self, cid: &ContentId) -> Result<Bytes, FetchError> {
        Ok(self.fetch_with_source(cid).await?.0)
    }

    /// Fetch the raw bytes of `cid` from the network, retrying as configured
    pub async fn fetch_remote(&self, cid: &ContentId) -> Result<Bytes, FetchError> {
        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.collect_chunks(cid).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < attempts => {
                    warn!(%cid, attempt, error = %e, "Fetch failed, retrying");
                    tokio::time::sleep(self.config.retry_delay()).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_with_source(&self, cid: &ContentId) -> Result<(Bytes, FetchSource), FetchError> {
        if self.config.prefer_local_store
            && let Some(bytes) = self.fetch_local(cid).await
        {
            return Ok((bytes, FetchSource::LocalStore));
        }
        Ok((self.fetch_remote(cid).await?, FetchSource::Network))
    }

    /// A store failure is treated as a miss
    async fn fetch_local(&self, cid: &ContentId) -> Option<Bytes> {
        match self.node.blockstore().get(cid).await {
            Ok(Some(bytes)) => {
                trace!(%cid, size = bytes.len(), "Block store hit");
                Some(bytes)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(%cid, error = %e, "Block store read failed, fetching from network");
                None
            }
        }
    }

    async fn collect_chunks(&self, cid: &ContentId) -> Result<Bytes, FetchError> {
        let mut stream = self.node.cat(cid);
        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::network(cid, e.to_string()))?;
            trace!(%cid, len = chunk.len(), "Received chunk");
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use cidnav_core::{Blockstore, MockNode};

    use crate::error::FetchErrorKind;

    fn fetcher(node: &Arc<MockNode>, config: FetchConfig) -> Fetcher {
        Fetcher::new(node.clone() as NodeHandle, config)
    }

    #[tokio::test]
    async fn test_fetch_concatenates_chunks() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        node.insert_chunks(
            "bafy123/index.html",
            vec![Bytes::from_static(b"<p>Hel"), Bytes::from_static(b"lo</p>")],
        );

        let fetched = fetcher(&node, FetchConfig::default())
            .fetch(&ContentId::new("bafy123/index.html"))
            .await
            .unwrap();

        assert_eq!(fetched.text, "<p>Hello</p>");
        assert_eq!(fetched.size, 12);
        assert_eq!(fetched.source, FetchSource::Network);
    }

    #[tokio::test]
    async fn test_multibyte_split_across_chunks() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        let bytes = "caf\u{e9} \u{1F600}".as_bytes().to_vec();
        // Split inside both the two-byte and the four-byte sequence
        node.insert_chunks(
            "bafy123/notes.txt",
            vec![
                Bytes::copy_from_slice(&bytes[..4]),
                Bytes::copy_from_slice(&bytes[4..8]),
                Bytes::copy_from_slice(&bytes[8..]),
            ],
        );

        let fetched = fetcher(&node, FetchConfig::default())
            .fetch(&ContentId::new("bafy123/notes.txt"))
            .await
            .unwrap();
        assert_eq!(fetched.text, "caf\u{e9} \u{1F600}");
    }

    #[tokio::test]
    async fn test_empty_stream_is_empty_text() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        node.insert_chunks("bafy123/empty.html", Vec::new());

        let fetched = fetcher(&node, FetchConfig::default())
            .fetch(&ContentId::new("bafy123/empty.html"))
            .await
            .unwrap();
        assert_eq!(fetched.text, "");
        assert_eq!(fetched.size, 0);
    }

    #[tokio::test]
    async fn test_missing_content_is_network_error() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        let cid = ContentId::new("bafy123/missing.html");

        let err = fetcher(&node, FetchConfig::default()).fetch(&cid).await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Network);
        assert_eq!(err.cid, cid);
        assert!(err.message.contains("no providers found"));
    }

    #[tokio::test]
    async fn test_failure_mid_stream() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        node.insert_broken(
            "bafy123/big.html",
            vec![Bytes::from_static(b"partial")],
            "connection reset",
        );

        let err = fetcher(&node, FetchConfig::default())
            .fetch(&ContentId::new("bafy123/big.html"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Network);
        assert!(err.message.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_decode_error() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        node.insert_chunks("bafy123/blob.txt", vec![Bytes::from_static(&[0x66, 0xff, 0x6f])]);

        let err = fetcher(&node, FetchConfig::default())
            .fetch(&ContentId::new("bafy123/blob.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_local_store_preferred() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        let cid = ContentId::new("bafy123/script.js");
        node.memory_blockstore()
            .put(&cid, Bytes::from_static(b"console.log(1)"))
            .await
            .unwrap();

        let fetched = fetcher(&node, FetchConfig::default()).fetch(&cid).await.unwrap();
        assert_eq!(fetched.text, "console.log(1)");
        assert_eq!(fetched.source, FetchSource::LocalStore);
        assert_eq!(node.cat_count(&cid), 0);

        let config = FetchConfig::default().with_prefer_local_store(false);
        let err = fetcher(&node, config).fetch(&cid).await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Network);
        assert_eq!(node.cat_count(&cid), 1);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        let cid = ContentId::new("bafy123/index.html");
        node.insert_text(cid.clone(), "ok");
        node.fail_next(cid.clone(), 1);

        let result = fetcher(&node, FetchConfig::default()).fetch(&cid).await;
        assert!(result.is_err());
        assert_eq!(node.cat_count(&cid), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_retry() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        let cid = ContentId::new("bafy123/index.html");
        node.insert_text(cid.clone(), "ok");
        node.fail_next(cid.clone(), 2);

        let config = FetchConfig::default()
            .with_max_attempts(3)
            .with_retry_delay(Duration::from_millis(100));
        let fetched = fetcher(&node, config).fetch(&cid).await.unwrap();

        assert_eq!(fetched.text, "ok");
        assert_eq!(node.cat_count(&cid), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up() {
        let node = Arc::new(MockNode::new("12D3KooWLocal"));
        let cid = ContentId::new("bafy123/index.html");
        node.insert_text(cid.clone(), "ok");
        node.fail_next(cid.clone(), 5);

        let config = FetchConfig::default().with_max_attempts(2);
        let err = fetcher(&node, config).fetch(&cid).await.unwrap_err();

        assert!(err.message.contains("transient failure"));
        assert_eq!(node.cat_count(&cid), 2);
    }
}
