//! Background tasks for peer state
//!
//! - [`EventPump`] feeds node notifications into the tracker
//! - [`RefreshTask`] writes peer state to the surface on a fixed interval
//!
//! Both stop when the shutdown channel fires or is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use cidnav_core::{DisplaySurface, NodeEvent};

use crate::node::NodeHandle;
use crate::tracker::PeerTracker;

/// Shortest period the refresh loop will run at
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// Dispatches node events into the tracker
pub struct EventPump {
    tracker: Arc<PeerTracker>,
    events: broadcast::Receiver<NodeEvent>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl EventPump {
    pub fn new(
        tracker: Arc<PeerTracker>,
        events: broadcast::Receiver<NodeEvent>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            tracker,
            events,
            shutdown_rx,
        }
    }

    /// Spawn the pump as a background task
    pub fn spawn(
        tracker: Arc<PeerTracker>,
        events: broadcast::Receiver<NodeEvent>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let task = Self::new(tracker, events, shutdown_rx);
        tokio::spawn(async move {
            task.run().await;
        })
    }

    async fn run(mut self) {
        debug!("Event pump started");

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    debug!("Event pump shutting down");
                    break;
                }
                event = self.events.recv() => match event {
                    Ok(event) => self.tracker.dispatch(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event pump lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Node event channel closed");
                        break;
                    }
                },
            }
        }
    }
}

/// Periodically mirrors peer state to the surface
pub struct RefreshTask {
    tracker: Arc<PeerTracker>,
    node: NodeHandle,
    surface: Arc<dyn DisplaySurface>,
    interval: Duration,
    shutdown_rx: broadcast::Receiver<()>,
    ticks: u64,
}

impl RefreshTask {
    pub fn new(
        tracker: Arc<PeerTracker>,
        node: NodeHandle,
        surface: Arc<dyn DisplaySurface>,
        interval: Duration,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            tracker,
            node,
            surface,
            interval: interval.max(MIN_REFRESH_INTERVAL),
            shutdown_rx,
            ticks: 0,
        }
    }

    /// Spawn the refresh loop as a background task
    ///
    /// The first refresh happens immediately. A zero interval is raised to
    /// one millisecond.
    pub fn spawn(
        tracker: Arc<PeerTracker>,
        node: NodeHandle,
        surface: Arc<dyn DisplaySurface>,
        interval: Duration,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let task = Self::new(tracker, node, surface, interval, shutdown_rx);
        tokio::spawn(async move {
            task.run().await;
        })
    }

    async fn run(mut self) {
        info!(interval_ms = self.interval.as_millis() as u64, "Peer refresh task started");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!(ticks = self.ticks, "Peer refresh task shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.ticks += 1;
                    self.tracker.refresh(self.node.as_ref(), self.surface.as_ref());
                }
            }
        }
    }
}
