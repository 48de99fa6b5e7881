//! View models written to the display surface
//!
//! The engine does not build a DOM. It produces plain data describing what
//! each display region shows, with user controls expressed as [`NavAction`]
//! values that the host hands back to the engine when activated.

use std::sync::Arc;
use std::time::Duration;

use crate::event::NodeStatus;
use crate::identifier::ContentId;

/// An action bound to a link or control in a rendered view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Fetch and render the given identifier in place of the current view
    Navigate(ContentId),
    /// Copy the given text to the clipboard and confirm with a toast
    CopyToClipboard(Arc<str>),
    /// Re-resolve the root entry point and render it
    ReturnToRoot,
}

/// Where a hyperlink points after rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Relative local asset, routed through the fetcher
    Local(ContentId),
    /// Absolute external URL, left for normal navigation
    External(String),
}

/// A hyperlink found in rendered hypertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    /// The href as written in the original markup
    pub href: String,
    /// Resolved target
    pub target: LinkTarget,
}

impl Hyperlink {
    /// The action to run when this link is activated
    ///
    /// External links have no bound action; the host follows them normally.
    pub fn action(&self) -> Option<NavAction> {
        match &self.target {
            LinkTarget::Local(cid) => Some(NavAction::Navigate(cid.clone())),
            LinkTarget::External(_) => None,
        }
    }

    /// Whether default navigation is suppressed for this link
    pub fn is_local(&self) -> bool {
        matches!(self.target, LinkTarget::Local(_))
    }
}

/// Structured markup rendered as navigable hypertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HypertextView {
    pub cid: ContentId,
    /// Markup with local link targets replaced by `#`
    pub markup: String,
    /// Every anchor with an href, in document order
    pub links: Vec<Hyperlink>,
}

impl HypertextView {
    /// Find the first link whose original href matches
    pub fn link(&self, href: &str) -> Option<&Hyperlink> {
        self.links.iter().find(|link| link.href == href)
    }

    /// Iterate over the links that were rewired to local navigation
    pub fn local_links(&self) -> impl Iterator<Item = &Hyperlink> {
        self.links.iter().filter(|link| link.is_local())
    }
}

/// A button in the inspection view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewControl {
    pub label: String,
    pub action: NavAction,
}

/// Presentation of the preformatted text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionStyle {
    pub preserve_whitespace: bool,
    pub border: &'static str,
    pub padding: &'static str,
    pub background: &'static str,
}

impl Default for InspectionStyle {
    fn default() -> Self {
        Self {
            preserve_whitespace: true,
            border: "1px solid #ccc",
            padding: "10px",
            background: "#f9f9f9",
        }
    }
}

/// Raw text shown verbatim with copy/return controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionView {
    pub cid: ContentId,
    /// The fetched text, never interpreted as markup
    pub text: Arc<str>,
    /// Controls, displayed above the text
    pub controls: Vec<ViewControl>,
    pub style: InspectionStyle,
}

impl InspectionView {
    /// Find a control by its label
    pub fn control(&self, label: &str) -> Option<&ViewControl> {
        self.controls.iter().find(|control| control.label == label)
    }
}

/// What the content area currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentView {
    #[default]
    Empty,
    Hypertext(HypertextView),
    Inspection(InspectionView),
    Error { message: String },
}

impl ContentView {
    /// The identifier being displayed, if any
    pub fn cid(&self) -> Option<&ContentId> {
        match self {
            Self::Hypertext(view) => Some(&view.cid),
            Self::Inspection(view) => Some(&view.cid),
            Self::Empty | Self::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Visual state of the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusStyle {
    Online,
    Offline,
}

impl StatusStyle {
    /// Style class applied to the status region
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Online => "online_grn",
            Self::Offline => "offline_red",
        }
    }
}

/// Text and style written to the status region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusIndicator {
    pub text: &'static str,
    pub style: StatusStyle,
}

impl From<NodeStatus> for StatusIndicator {
    fn from(status: NodeStatus) -> Self {
        if status.is_online() {
            Self {
                text: "Online",
                style: StatusStyle::Online,
            }
        } else {
            Self {
                text: "Offline",
                style: StatusStyle::Offline,
            }
        }
    }
}

/// Transient confirmation message
///
/// Shown for `visible_for`, then faded out over `fade_for` and removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub visible_for: Duration,
    pub fade_for: Duration,
}
