//! # cidnav Browser
//!
//! Content navigation and peer-state tracking engine.
//!
//! Given a root content identifier, the engine fetches content from a
//! peer-to-peer content network, decides how to present it, rewires relative
//! links into in-engine navigation, and keeps a periodically refreshed view
//! of peer connectivity. Everything it shows goes to a host-provided
//! [`DisplaySurface`](cidnav_core::DisplaySurface) as plain view models.
//!
//! ## Data Flow
//!
//! ```text
//! root file -> Resolver -> Fetcher -> Renderer (Classifier, LinkRewriter) -> surface
//!                              ^                                              |
//!                              +------------ NavAction (link / control) <-----+
//!
//! node events -> EventPump -> PeerTracker <- RefreshTask (interval) -> surface
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cidnav_browser::{BrowserConfig, Host, NodeCell, Session};
//! use cidnav_logging::ActivityLog;
//!
//! let cell = NodeCell::new(Arc::new(ActivityLog::new()));
//! let session = Session::launch(
//!     BrowserConfig::default(),
//!     &cell,
//!     || async { create_node().await },
//!     Host::new(surface, clipboard),
//! )
//! .await?;
//!
//! // Later, when the user clicks a rewired link
//! session.browser().dispatch(link.action().unwrap()).await?;
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod navigator;
pub mod node;
pub mod preload;
pub mod render;
pub mod resolver;
pub mod rewrite;
pub mod session;
pub mod tasks;
pub mod tracker;

pub use classify::{Classifier, RenderMode};
pub use config::{BrowserConfig, FetchConfig, MarkupTrust, ToastConfig, load_root_cid};
pub use error::{
    BrowserError, BrowserResult, ConfigError, FetchError, FetchErrorKind, PreloadError,
    ResolveError,
};
pub use fetcher::{FetchSource, Fetched, Fetcher};
pub use navigator::{ActionOutcome, NavigationOutcome, Navigator};
pub use node::{NodeCell, NodeHandle};
pub use preload::Preloader;
pub use render::{COPY_LABEL, RETURN_LABEL, Renderer, sanitize};
pub use resolver::{Resolver, resolve};
pub use rewrite::{LinkRewriter, Rewired};
pub use session::{Host, Session, SurfaceLogSink};
pub use tasks::{EventPump, RefreshTask};
pub use tracker::{PeerSnapshot, PeerTracker};
