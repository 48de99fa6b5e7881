//! Navigation between content items
//!
//! The navigator owns the content area. Each navigation clears it, fetches
//! and renders the target, and writes the result; fetch failures are shown
//! inline instead of propagating. Navigations are numbered, and a fetch that
//! completes after a newer navigation has started is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use cidnav_core::{
    Clipboard, ClipboardError, ContentId, ContentView, DisplaySurface, NavAction, Toast,
};
use cidnav_logging::ActivityLog;

use crate::classify::RenderMode;
use crate::config::{BrowserConfig, ToastConfig};
use crate::error::{BrowserError, ResolveError};
use crate::fetcher::Fetcher;
use crate::render::Renderer;
use crate::resolver::Resolver;

/// How a navigation ended
#[derive(Debug)]
pub enum NavigationOutcome {
    /// The content was rendered in the given mode
    Displayed(RenderMode),
    /// An error message was displayed instead
    Failed(BrowserError),
    /// A newer navigation started first; nothing was displayed
    Superseded,
}

impl NavigationOutcome {
    pub fn is_displayed(&self) -> bool {
        matches!(self, Self::Displayed(_))
    }
}

/// Result of dispatching a [`NavAction`]
#[derive(Debug)]
pub enum ActionOutcome {
    Navigated(NavigationOutcome),
    /// Text reached the clipboard and a toast is showing
    Copied { toast_id: u64 },
    /// The clipboard refused the write; no toast was shown
    CopyFailed(ClipboardError),
}

/// Drives the content area
pub struct Navigator {
    resolver: Arc<Resolver>,
    fetcher: Arc<Fetcher>,
    renderer: Renderer,
    surface: Arc<dyn DisplaySurface>,
    clipboard: Arc<dyn Clipboard>,
    log: Arc<ActivityLog>,
    toast: ToastConfig,
    generation: AtomicU64,
    next_toast_id: AtomicU64,
}

impl Navigator {
    pub fn new(
        config: &BrowserConfig,
        resolver: Arc<Resolver>,
        fetcher: Arc<Fetcher>,
        surface: Arc<dyn DisplaySurface>,
        clipboard: Arc<dyn Clipboard>,
        log: Arc<ActivityLog>,
    ) -> Self {
        Self {
            renderer: Renderer::from_config(config, resolver.clone()),
            resolver,
            fetcher,
            surface,
            clipboard,
            log,
            toast: config.toast.clone(),
            generation: AtomicU64::new(0),
            next_toast_id: AtomicU64::new(1),
        }
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    /// Number of navigations started so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Fetch and display `cid`
    #[instrument(skip(self), fields(cid = %cid))]
    pub async fn navigate(&self, cid: ContentId) -> NavigationOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.surface.set_content(ContentView::Empty);

        let fetched = self.fetcher.fetch(&cid).await;
        if self.generation() != generation {
            debug!(generation, latest = self.generation(), "Discarding superseded navigation");
            return NavigationOutcome::Superseded;
        }

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(error = %e, kind = ?e.kind, "Error fetching CID");
                self.surface.set_content(ContentView::Error {
                    message: format!("Error fetching CID: {e}"),
                });
                return NavigationOutcome::Failed(e.into());
            }
        };

        match self.renderer.render(&fetched.text, &cid) {
            Ok(view) => {
                let mode = self.renderer.mode(&cid);
                self.surface.set_content(view);
                self.log.append(format!("Fetched content for CID: {cid}"));
                info!(?mode, size = fetched.size, "Displayed content");
                NavigationOutcome::Displayed(mode)
            }
            Err(e) => {
                warn!(error = %e, "Error rendering CID");
                self.surface.set_content(ContentView::Error {
                    message: format!("Error rendering CID: {e}"),
                });
                NavigationOutcome::Failed(e.into())
            }
        }
    }

    /// Navigate to `relative` under the root
    pub async fn navigate_relative(
        &self,
        relative: &str,
    ) -> Result<NavigationOutcome, ResolveError> {
        let cid = self.resolver.resolve(relative)?;
        Ok(self.navigate(cid).await)
    }

    /// Navigate to the root's entry point
    pub async fn open_root(&self) -> Result<NavigationOutcome, ResolveError> {
        let cid = self.resolver.entry_point()?;
        Ok(self.navigate(cid).await)
    }

    /// Run an action bound to a link or control
    pub async fn dispatch(&self, action: NavAction) -> Result<ActionOutcome, ResolveError> {
        let outcome = match action {
            NavAction::Navigate(cid) => ActionOutcome::Navigated(self.navigate(cid).await),
            NavAction::ReturnToRoot => ActionOutcome::Navigated(self.open_root().await?),
            NavAction::CopyToClipboard(text) => self.copy_to_clipboard(&text).await,
        };
        Ok(outcome)
    }

    async fn copy_to_clipboard(&self, text: &str) -> ActionOutcome {
        if let Err(e) = self.clipboard.write_text(text).await {
            warn!(error = %e, "Clipboard write failed");
            return ActionOutcome::CopyFailed(e);
        }

        let toast = Toast {
            id: self.next_toast_id.fetch_add(1, Ordering::SeqCst),
            message: self.toast.message.clone(),
            visible_for: self.toast.visible_for(),
            fade_for: self.toast.fade_for(),
        };
        debug!(toast_id = toast.id, len = text.len(), "Copied to clipboard");
        self.surface.show_toast(&toast);
        spawn_toast_timer(self.surface.clone(), &toast);
        ActionOutcome::Copied { toast_id: toast.id }
    }
}

/// Fade the toast after its visible period, then remove it
fn spawn_toast_timer(surface: Arc<dyn DisplaySurface>, toast: &Toast) -> JoinHandle<()> {
    let (id, visible_for, fade_for) = (toast.id, toast.visible_for, toast.fade_for);
    tokio::spawn(async move {
        tokio::time::sleep(visible_for).await;
        surface.fade_toast(id);
        tokio::time::sleep(fade_for).await;
        surface.remove_toast(id);
    })
}
