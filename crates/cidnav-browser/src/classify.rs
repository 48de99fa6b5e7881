//! Render mode selection

use cidnav_core::ContentId;

/// How fetched content is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Raw text with copy and return controls
    Inspection,
    /// Markup with navigable links
    Hypertext,
}

/// Chooses a render mode from the identifier's suffix
///
/// Matching is case-sensitive: `script.JS` renders as hypertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    suffixes: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(vec![".js".to_string(), ".log".to_string(), ".txt".to_string()])
    }
}

impl Classifier {
    /// Empty suffixes are ignored; they would match every identifier
    pub fn new(suffixes: Vec<String>) -> Self {
        Self {
            suffixes: suffixes.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    pub fn classify(&self, cid: &ContentId) -> RenderMode {
        if self.suffixes.iter().any(|suffix| cid.has_suffix(suffix)) {
            RenderMode::Inspection
        } else {
            RenderMode::Hypertext
        }
    }
}
