//! Turning fetched text into views

use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use cidnav_core::{
    ContentId, ContentView, HypertextView, InspectionStyle, InspectionView, NavAction,
    ViewControl,
};

use crate::classify::{Classifier, RenderMode};
use crate::config::{BrowserConfig, MarkupTrust};
use crate::error::ResolveError;
use crate::resolver::Resolver;
use crate::rewrite::LinkRewriter;

/// Label of the inspection view's copy control
pub const COPY_LABEL: &str = "Copy to Clipboard";

/// Label of the inspection view's return control
pub const RETURN_LABEL: &str = "Return to Original Page";

static SCRIPT_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?(?:</script\s*>|\z)").expect("valid script pattern")
});

/// Any opening tag, skipping `>` inside quoted attribute values
static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<[A-Za-z][A-Za-z0-9-]*(?:[^>"']|"[^"]*"|'[^']*')*>"#)
        .expect("valid open tag pattern")
});

static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("valid event handler pattern")
});

static SCRIPT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(\s(?:href|src)\s*=\s*)(?:"\s*javascript:[^"]*"|'\s*javascript:[^']*'|javascript:[^\s>]*)"#,
    )
    .expect("valid script url pattern")
});

/// Remove script elements, inline event handlers and `javascript:` URLs
pub fn sanitize(markup: &str) -> String {
    let markup = SCRIPT_ELEMENT.replace_all(markup, "");
    OPEN_TAG
        .replace_all(&markup, |caps: &Captures| {
            let tag = EVENT_HANDLER.replace_all(&caps[0], "");
            SCRIPT_URL.replace_all(&tag, r##"${1}"#""##).into_owned()
        })
        .into_owned()
}

/// Builds the view for fetched content
#[derive(Debug)]
pub struct Renderer {
    classifier: Classifier,
    rewriter: LinkRewriter,
    trust: MarkupTrust,
    resolver: Arc<Resolver>,
}

impl Renderer {
    pub fn new(
        classifier: Classifier,
        rewriter: LinkRewriter,
        trust: MarkupTrust,
        resolver: Arc<Resolver>,
    ) -> Self {
        Self {
            classifier,
            rewriter,
            trust,
            resolver,
        }
    }

    pub fn from_config(config: &BrowserConfig, resolver: Arc<Resolver>) -> Self {
        Self::new(
            Classifier::new(config.inspection_suffixes.clone()),
            LinkRewriter::new(config.external_schemes.clone()),
            config.markup_trust,
            resolver,
        )
    }

    pub fn mode(&self, cid: &ContentId) -> RenderMode {
        self.classifier.classify(cid)
    }

    /// Render `text` fetched from `cid`
    pub fn render(&self, text: &str, cid: &ContentId) -> Result<ContentView, ResolveError> {
        let view = match self.mode(cid) {
            RenderMode::Inspection => ContentView::Inspection(inspection_view(cid, text)),
            RenderMode::Hypertext => {
                let markup = match self.trust {
                    MarkupTrust::Trusted => Cow::Borrowed(text),
                    MarkupTrust::Sanitize => Cow::Owned(sanitize(text)),
                };
                let rewired = self.rewriter.rewire(&markup, &self.resolver)?;
                ContentView::Hypertext(HypertextView {
                    cid: cid.clone(),
                    markup: rewired.markup,
                    links: rewired.links,
                })
            }
        };
        Ok(view)
    }
}

fn inspection_view(cid: &ContentId, text: &str) -> InspectionView {
    let text: Arc<str> = Arc::from(text);
    InspectionView {
        cid: cid.clone(),
        controls: vec![
            ViewControl {
                label: COPY_LABEL.to_string(),
                action: NavAction::CopyToClipboard(text.clone()),
            },
            ViewControl {
                label: RETURN_LABEL.to_string(),
                action: NavAction::ReturnToRoot,
            },
        ],
        text,
        style: InspectionStyle::default(),
    }
}
