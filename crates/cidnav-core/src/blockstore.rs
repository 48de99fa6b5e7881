//! Block storage keyed by content identifier
//!
//! Blocks live for the process lifetime only. [`MemoryBlockstore`] is the
//! in-memory implementation used by [`MockNode`](crate::MockNode) and by hosts
//! that have no block store of their own.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::{debug, trace};

use crate::error::StorageError;
use crate::identifier::ContentId;

/// Key/value block store
#[async_trait]
pub trait Blockstore: Send + Sync {
    /// Store `data` under `cid`, replacing any previous block
    async fn put(&self, cid: &ContentId, data: Bytes) -> Result<(), StorageError>;

    /// Load the block stored under `cid`
    async fn get(&self, cid: &ContentId) -> Result<Option<Bytes>, StorageError>;

    /// Check whether a block exists
    async fn has(&self, cid: &ContentId) -> Result<bool, StorageError> {
        Ok(self.get(cid).await?.is_some())
    }
}

/// In-memory block store with an optional byte capacity
#[derive(Debug, Default)]
pub struct MemoryBlockstore {
    blocks: DashMap<ContentId, Bytes>,
    max_bytes: Option<usize>,
    used_bytes: AtomicUsize,
}

impl MemoryBlockstore {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes beyond `max_bytes` in total
    pub fn with_capacity(max_bytes: usize) -> Self {
        Self {
            max_bytes: Some(max_bytes),
            ..Self::default()
        }
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total bytes held
    pub fn used_bytes(&self) -> usize {
        self.used_bytes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Blockstore for MemoryBlockstore {
    async fn put(&self, cid: &ContentId, data: Bytes) -> Result<(), StorageError> {
        let replaced = self.blocks.get(cid).map(|block| block.len()).unwrap_or(0);
        let projected = self.used_bytes() - replaced + data.len();

        if let Some(max) = self.max_bytes
            && projected > max
        {
            debug!(%cid, size = data.len(), max, "Block rejected, store full");
            return Err(StorageError::CapacityExceeded);
        }

        trace!(%cid, size = data.len(), "Storing block");
        self.used_bytes.store(projected, Ordering::SeqCst);
        self.blocks.insert(cid.clone(), data);
        Ok(())
    }

    async fn get(&self, cid: &ContentId) -> Result<Option<Bytes>, StorageError> {
        Ok(self.blocks.get(cid).map(|block| block.value().clone()))
    }
}
