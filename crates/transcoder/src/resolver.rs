//! The computed-style oracle.
//!
//! Style resolution needs a layout engine, so it stays where layout
//! already happened: a capture of `getComputedStyle` output (plus rendered
//! widths) is taken in the browser at the forced export width and handed
//! to the transcoder as data. The transform itself never computes layout.

use css_email::ResolvedStyle;
use dom::{Document, NodeId};
use serde::Deserialize;
use std::collections::HashMap;

/// Per-node style resolution, injected into the transform.
pub trait StyleResolver {
    /// Resolved style for a source-tree node, or `None` when the oracle
    /// has no entry for it (treated as non-fatal by callers).
    fn resolve(&self, node: NodeId) -> Option<&ResolvedStyle>;

    /// Rendered width in px, if the oracle measured one. Only images
    /// consult this.
    fn rendered_width(&self, node: NodeId) -> Option<f32> {
        let _ = node;
        None
    }
}

/// One captured element: resolved declarations plus an optional rendered
/// width. Entries are listed in document order of the captured subtree,
/// root element first — the same order `querySelectorAll("*")` walks.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NodeCapture {
    #[serde(default)]
    pub styles: HashMap<String, String>,
    #[serde(default)]
    pub width: Option<f32>,
}

/// A capture bound to the element nodes of a parsed source subtree.
pub struct CapturedStyles {
    index_of: HashMap<NodeId, usize>,
    resolved: Vec<ResolvedStyle>,
    widths: Vec<Option<f32>>,
}

impl CapturedStyles {
    /// Bind capture entries to the subtree's elements by document-order
    /// index. Extra elements (capture shorter than the tree) simply stay
    /// unbound; extra capture entries are ignored. Both are logged since
    /// they usually mean the capture and the markup went out of sync.
    pub fn bind(doc: &Document, root: NodeId, captures: Vec<NodeCapture>) -> Self {
        let elements = doc.elements_in(root);
        if elements.len() != captures.len() {
            log::warn!(
                target: "transcoder",
                "capture has {} entries for {} elements",
                captures.len(),
                elements.len()
            );
        }
        let mut index_of = HashMap::new();
        let mut resolved = Vec::with_capacity(captures.len());
        let mut widths = Vec::with_capacity(captures.len());
        for (index, (node, capture)) in elements.into_iter().zip(captures).enumerate() {
            index_of.insert(node, index);
            resolved.push(capture.styles.into_iter().collect());
            widths.push(capture.width);
        }
        Self {
            index_of,
            resolved,
            widths,
        }
    }

    /// Parse a JSON capture (an array of entries) and bind it.
    ///
    /// # Errors
    /// Returns the underlying deserialization error for malformed JSON.
    pub fn from_json(
        doc: &Document,
        root: NodeId,
        json: &str,
    ) -> Result<Self, serde_json::Error> {
        let captures: Vec<NodeCapture> = serde_json::from_str(json)?;
        Ok(Self::bind(doc, root, captures))
    }
}

impl StyleResolver for CapturedStyles {
    fn resolve(&self, node: NodeId) -> Option<&ResolvedStyle> {
        self.index_of.get(&node).map(|index| &self.resolved[*index])
    }

    fn rendered_width(&self, node: NodeId) -> Option<f32> {
        self.index_of
            .get(&node)
            .and_then(|index| self.widths[*index])
    }
}
