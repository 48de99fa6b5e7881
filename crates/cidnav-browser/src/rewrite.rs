//! Link rewriting for hypertext views
//!
//! Every anchor whose href is a relative path is routed back through the
//! engine: the href in the markup becomes `#` and the link is reported with
//! a [`NavAction::Navigate`](cidnav_core::NavAction::Navigate) target.
//! Hrefs starting with an external scheme are left untouched.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use cidnav_core::{Hyperlink, LinkTarget};

use crate::error::ResolveError;
use crate::resolver::Resolver;

/// Opening tag of an anchor element, skipping `>` inside quoted values
static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("valid anchor pattern")
});

/// An href attribute with a double-quoted, single-quoted or bare value
static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\shref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("valid href pattern")
});

/// Hypertext after rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewired {
    pub markup: String,
    /// Links in document order
    pub links: Vec<Hyperlink>,
}

/// Rewrites relative anchors into engine navigation
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    external_schemes: Vec<String>,
}

impl Default for LinkRewriter {
    fn default() -> Self {
        Self::new(vec!["http://".to_string(), "https://".to_string()])
    }
}

impl LinkRewriter {
    pub fn new(external_schemes: Vec<String>) -> Self {
        Self { external_schemes }
    }

    /// Whether `href` starts with an external scheme, ignoring ASCII case
    pub fn is_external(&self, href: &str) -> bool {
        self.external_schemes.iter().any(|scheme| {
            href.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
    }

    /// Rewrite every relative anchor in `markup`
    ///
    /// Anchors without an href, or with an empty one, are left alone.
    pub fn rewire(&self, markup: &str, resolver: &Resolver) -> Result<Rewired, ResolveError> {
        let mut links = Vec::new();
        let mut out = String::with_capacity(markup.len());
        let mut copied = 0;

        for tag in ANCHOR.find_iter(markup) {
            let Some(caps) = HREF.captures(tag.as_str()) else {
                continue;
            };
            let Some(value) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
                continue;
            };
            let href = value.as_str();
            if href.is_empty() {
                continue;
            }

            if self.is_external(href) {
                links.push(Hyperlink {
                    href: href.to_string(),
                    target: LinkTarget::External(href.to_string()),
                });
                continue;
            }

            let cid = resolver.resolve(href)?;
            trace!(href, %cid, "Rewiring link");

            let start = tag.start() + value.start();
            out.push_str(&markup[copied..start]);
            out.push('#');
            copied = tag.start() + value.end();

            links.push(Hyperlink {
                href: href.to_string(),
                target: LinkTarget::Local(cid),
            });
        }
        out.push_str(&markup[copied..]);

        Ok(Rewired { markup: out, links })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cidnav_core::{ContentId, NavAction, RootCid};

    fn resolver() -> Resolver {
        Resolver::with_root(RootCid::parse("bafy123").unwrap(), "index.html")
    }

    fn rewire(markup: &str) -> Rewired {
        LinkRewriter::default().rewire(markup, &resolver()).unwrap()
    }

    #[test]
    fn test_relative_link_is_rewired() {
        let rewired = rewire(r#"<p>See <a href="page2.html">next</a></p>"#);

        assert_eq!(rewired.markup, r##"<p>See <a href="#">next</a></p>"##);
        assert_eq!(rewired.links.len(), 1);
        let link = &rewired.links[0];
        assert_eq!(link.href, "page2.html");
        assert_eq!(
            link.action(),
            Some(NavAction::Navigate(ContentId::new("bafy123/page2.html")))
        );
    }

    #[test]
    fn test_external_links_untouched() {
        let markup = r#"<a href="https://example.com">x</a><a href="HTTP://EXAMPLE.COM">y</a>"#;
        let rewired = rewire(markup);

        assert_eq!(rewired.markup, markup);
        assert_eq!(rewired.links.len(), 2);
        assert!(rewired.links.iter().all(|link| link.action().is_none()));
        assert_eq!(
            rewired.links[0].target,
            LinkTarget::External("https://example.com".to_string())
        );
    }

    #[test]
    fn test_quoting_styles() {
        let rewired = rewire("<a href='a.html'>a</a> <A HREF=b.txt>b</A> <a class=\"x\" href = \"c/d.html\">c</a>");

        assert_eq!(
            rewired.markup,
            "<a href='#'>a</a> <A HREF=#>b</A> <a class=\"x\" href = \"#\">c</a>"
        );
        let targets: Vec<_> = rewired
            .links
            .iter()
            .map(|link| link.action().unwrap())
            .collect();
        assert_eq!(
            targets,
            vec![
                NavAction::Navigate(ContentId::new("bafy123/a.html")),
                NavAction::Navigate(ContentId::new("bafy123/b.txt")),
                NavAction::Navigate(ContentId::new("bafy123/c/d.html")),
            ]
        );
    }

    #[test]
    fn test_anchors_without_href_ignored() {
        let markup = r#"<a name="top">top</a><a href="">empty</a><abbr href="x">y</abbr>"#;
        let rewired = rewire(markup);
        assert_eq!(rewired.markup, markup);
        assert!(rewired.links.is_empty());
    }

    #[test]
    fn test_only_href_attribute_matches() {
        let rewired = rewire(r#"<a data-href="skip.html" href="keep.html">k</a>"#);
        assert_eq!(rewired.markup, r##"<a data-href="skip.html" href="#">k</a>"##);
        assert_eq!(rewired.links[0].href, "keep.html");
    }

    #[test]
    fn test_quoted_angle_bracket_in_attribute() {
        let rewired = rewire(r#"<a title="a>b" href="page2.html">Next</a>"#);
        assert_eq!(rewired.markup, r##"<a title="a>b" href="#">Next</a>"##);
        assert_eq!(
            rewired.links[0].action(),
            Some(NavAction::Navigate(ContentId::new("bafy123/page2.html")))
        );
    }

    #[test]
    fn test_fragment_and_mailto_are_local() {
        let rewired = rewire(r##"<a href="#section">s</a><a href="mailto:a@b.c">m</a>"##);
        assert_eq!(rewired.links.len(), 2);
        assert!(rewired.links.iter().all(Hyperlink::is_local));
        assert_eq!(
            rewired.links[0].action(),
            Some(NavAction::Navigate(ContentId::new("bafy123/#section")))
        );
    }

    #[test]
    fn test_multiline_tag_and_surrounding_text() {
        let markup = "before <a\n  href=\"one.html\"\n  title=\"One\">1</a> middle <a href=\"two.html\">2</a> after";
        let rewired = rewire(markup);
        assert_eq!(
            rewired.markup,
            "before <a\n  href=\"#\"\n  title=\"One\">1</a> middle <a href=\"#\">2</a> after"
        );
        assert_eq!(rewired.links.len(), 2);
    }

    #[test]
    fn test_unloaded_root_fails() {
        let resolver = Resolver::new("index.html");
        let result = LinkRewriter::default().rewire(r#"<a href="x.html">x</a>"#, &resolver);
        assert_eq!(result, Err(ResolveError::RootNotLoaded));

        // Markup without relative links needs no root
        let result = LinkRewriter::default().rewire("<p>plain</p>", &resolver);
        assert!(result.is_ok());
    }
}
