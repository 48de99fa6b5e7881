//! One-time node initialization

use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, instrument};

use cidnav_core::{ContentNode, NodeError};
use cidnav_logging::ActivityLog;

/// Shared handle to the content node
pub type NodeHandle = Arc<dyn ContentNode>;

/// Holds the node, creating it at most once
///
/// Concurrent first callers wait on a single in-flight creation and all
/// receive the same handle. A failed creation leaves the cell empty.
pub struct NodeCell {
    cell: OnceCell<NodeHandle>,
    log: Arc<ActivityLog>,
}

impl NodeCell {
    pub fn new(log: Arc<ActivityLog>) -> Self {
        Self {
            cell: OnceCell::new(),
            log,
        }
    }

    /// The activity log creation is reported to
    pub fn log(&self) -> &Arc<ActivityLog> {
        &self.log
    }

    /// The node, if it has been created
    pub fn get(&self) -> Option<NodeHandle> {
        self.cell.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Return the node, running `factory` if it does not exist yet
    #[instrument(skip_all)]
    pub async fn get_or_init<F, Fut>(&self, factory: F) -> Result<NodeHandle, NodeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<NodeHandle, NodeError>>,
    {
        let node = self
            .cell
            .get_or_try_init(|| async {
                let node = factory().await?;
                info!(peer_id = %node.peer_id(), "Node created");
                self.log.append("Created node instance");
                Ok::<_, NodeError>(node)
            })
            .await?;
        Ok(node.clone())
    }
}
