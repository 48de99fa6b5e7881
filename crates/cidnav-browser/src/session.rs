//! Browser session startup and shutdown

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use cidnav_core::{Clipboard, ContentId, DisplaySurface, NodeError, RootCid};
use cidnav_logging::{ActivityLog, LogEntry, LogSink, SinkId};

use crate::config::{BrowserConfig, load_root_cid};
use crate::error::{BrowserResult, ResolveError};
use crate::fetcher::Fetcher;
use crate::navigator::{NavigationOutcome, Navigator};
use crate::node::{NodeCell, NodeHandle};
use crate::preload::Preloader;
use crate::resolver::Resolver;
use crate::tasks::{EventPump, RefreshTask};
use crate::tracker::{PeerSnapshot, PeerTracker};

/// Mirrors activity log entries onto the surface's log region
pub struct SurfaceLogSink {
    surface: Arc<dyn DisplaySurface>,
}

impl SurfaceLogSink {
    pub fn new(surface: Arc<dyn DisplaySurface>) -> Self {
        Self { surface }
    }
}

impl LogSink for SurfaceLogSink {
    fn write_entry(&self, entry: &LogEntry) {
        self.surface.append_log_line(&entry.to_string());
    }
}

/// Host-provided collaborators
#[derive(Clone)]
pub struct Host {
    pub surface: Arc<dyn DisplaySurface>,
    pub clipboard: Arc<dyn Clipboard>,
}

impl Host {
    pub fn new(surface: Arc<dyn DisplaySurface>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self { surface, clipboard }
    }
}

/// A running browser
///
/// Sessions launched on the same [`NodeCell`] share its activity log. Each
/// live session mirrors that log onto its own surface until it is dropped.
pub struct Session {
    config: BrowserConfig,
    node: NodeHandle,
    navigator: Arc<Navigator>,
    tracker: Arc<PeerTracker>,
    host: Host,
    log: Arc<ActivityLog>,
    sink: SinkId,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Session {
    /// Start a session
    ///
    /// An invalid configuration, a missing or empty root identifier and a
    /// failed node creation abort startup. Preload failures and a failed first page do not.
    #[instrument(skip_all)]
    pub async fn launch<F, Fut>(
        config: BrowserConfig,
        node_cell: &NodeCell,
        factory: F,
        host: Host,
    ) -> BrowserResult<Self>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<NodeHandle, NodeError>>,
    {
        config.validate()?;
        let root = load_root_cid(&config.root_cid_path).await?;
        info!(root = %root, "Loaded root CID");

        let log = node_cell.log().clone();
        let sink = log.add_sink(Arc::new(SurfaceLogSink::new(host.surface.clone())));
        let started = Self::start(config, root, node_cell, factory, host, sink).await;
        if started.is_err() {
            log.remove_sink(sink);
        }
        started
    }

    async fn start<F, Fut>(
        config: BrowserConfig,
        root: RootCid,
        node_cell: &NodeCell,
        factory: F,
        host: Host,
        sink: SinkId,
    ) -> BrowserResult<Self>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<NodeHandle, NodeError>>,
    {
        let log = node_cell.log().clone();
        let node = node_cell.get_or_init(factory).await?;
        host.surface.set_node_id(&node.peer_id());
        let events = node.subscribe();

        let resolver = Arc::new(Resolver::with_root(root, config.entry_point.clone()));
        let fetcher = Arc::new(Fetcher::new(node.clone(), config.fetch.clone()));

        let targets = config
            .preload
            .iter()
            .map(|relative| resolver.resolve(relative))
            .collect::<Result<Vec<ContentId>, ResolveError>>()?;
        let preloader = Preloader::new(node.clone(), fetcher.clone(), log.clone());
        let stored = preloader.preload_all(&targets).await;
        info!(stored, requested = targets.len(), "Preload complete");

        let navigator = Arc::new(Navigator::new(
            &config,
            resolver,
            fetcher,
            host.surface.clone(),
            host.clipboard.clone(),
            log.clone(),
        ));
        if let NavigationOutcome::Failed(e) = navigator.open_root().await? {
            warn!(error = %e, "Root entry point could not be displayed");
        }

        let tracker = Arc::new(PeerTracker::new(log.clone()));
        let (shutdown_tx, _) = broadcast::channel(1);
        let tasks = vec![
            EventPump::spawn(tracker.clone(), events, shutdown_tx.subscribe()),
            RefreshTask::spawn(
                tracker.clone(),
                node.clone(),
                host.surface.clone(),
                config.refresh_interval(),
                shutdown_tx.subscribe(),
            ),
        ];

        info!(peer_id = %node.peer_id(), "Browser session started");
        Ok(Self {
            config,
            node,
            navigator,
            tracker,
            host,
            log,
            sink,
            shutdown_tx,
            tasks: Mutex::new(tasks),
        })
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// The navigator driving the content area
    pub fn browser(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    pub fn tracker(&self) -> &Arc<PeerTracker> {
        &self.tracker
    }

    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    pub fn log(&self) -> &Arc<ActivityLog> {
        &self.log
    }

    /// Refresh peer state now instead of waiting for the next tick
    pub fn refresh_now(&self) -> PeerSnapshot {
        self.tracker
            .refresh(self.node.as_ref(), self.host.surface.as_ref())
    }

    /// Stop the background tasks and wait for them to finish
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }
        info!("Browser session stopped");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.log.remove_sink(self.sink);
        let _ = self.shutdown_tx.send(());
    }
}
