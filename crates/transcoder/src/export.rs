//! Export orchestration: one blocking pass from live preview markup to an
//! email-safe fragment plus a standalone preview document.

use crate::cards::normalize_card;
use crate::hybrid::{resolve_grid_markers, resolve_row_markers};
use crate::inline::InlinePass;
use crate::resolver::StyleResolver;
use crate::schema::Recognizer;
use css_email::InlineStyle;
use dom::{Document, NodeId, NodeKind, serialize_node};
use log::debug;
use std::fmt;

/// Elements that must never reach an email client: executable content,
/// embedded media, form controls, and editor chrome.
const DISALLOWED_TAGS: &[&str] = &[
    "script", "style", "iframe", "audio", "video", "embed", "object", "noscript", "form", "meta",
    "button", "input", "select", "textarea", "link", "canvas",
];

/// Width forced onto the source container while styles are read, so the
/// capture reflects the email layout rather than the editor viewport.
const FORCED_WIDTH: &str = "600px";

#[derive(Debug, PartialEq, Eq)]
pub enum ExportError {
    /// The export target element does not exist; nothing was mutated.
    MissingTarget,
}

impl fmt::Display for ExportError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTarget => formatter.write_str("export target not found"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Both export outputs, owned. The fragment is the clipboard payload for
/// rich-text paste targets (no document scaffolding); the preview is a
/// complete document for opening in a separate browsing context.
#[derive(Clone, Debug)]
pub struct ExportArtifacts {
    pub fragment: String,
    pub preview_document: String,
}

/// User-facing notice the host shows after a successful clipboard write.
/// The host must only show it once the write actually succeeded.
pub fn confirmation_notice() -> &'static str {
    "Email-compatible HTML copied to clipboard. The layout uses table-based responsive structure."
}

/// Scoped width forcing on the source root. The saved declarations are
/// restored by `restore`, which callers run before propagating any
/// transform error.
struct ForcedWidth {
    node: NodeId,
    saved_width: Option<String>,
    saved_max_width: Option<String>,
}

impl ForcedWidth {
    fn apply(doc: &mut Document, node: NodeId) -> Self {
        let mut style = InlineStyle::parse(doc.attr(node, "style").unwrap_or(""));
        let saved_width = style.get("width").map(str::to_owned);
        let saved_max_width = style.get("max-width").map(str::to_owned);
        style.set("width", FORCED_WIDTH);
        style.set("max-width", FORCED_WIDTH);
        doc.set_attr(node, "style", &style.to_attr_value());
        Self {
            node,
            saved_width,
            saved_max_width,
        }
    }

    fn restore(self, doc: &mut Document) {
        let mut style = InlineStyle::parse(doc.attr(self.node, "style").unwrap_or(""));
        match self.saved_width {
            Some(width) => style.set("width", &width),
            None => style.remove_where(|property| property == "width"),
        }
        match self.saved_max_width {
            Some(max_width) => style.set("max-width", &max_width),
            None => style.remove_where(|property| property == "max-width"),
        }
        if style.is_empty() {
            doc.remove_attr(self.node, "style");
        } else {
            doc.set_attr(self.node, "style", &style.to_attr_value());
        }
    }
}

/// Run the full export on the subtree rooted at `root`.
///
/// The source tree is read-only apart from the scoped width forcing on
/// `root`, which is rolled back before this function returns — on the
/// error path too.
///
/// # Errors
/// [`ExportError::MissingTarget`] when `root` is not an element of `doc`;
/// the transform itself degrades per node instead of failing.
pub fn export_email<R: StyleResolver>(
    doc: &mut Document,
    root: NodeId,
    resolver: &R,
) -> Result<ExportArtifacts, anyhow::Error> {
    if !doc.is_element(root) {
        return Err(ExportError::MissingTarget.into());
    }

    let forced = ForcedWidth::apply(doc, root);
    let outcome = transform(doc, root, resolver);
    forced.restore(doc);
    let (work, work_root) = outcome?;

    let fragment = serialize_node(&work, work_root);
    let preview_document = preview_document(&fragment);
    debug!(
        target: "transcoder",
        "export produced {} bytes of fragment",
        fragment.len()
    );
    Ok(ExportArtifacts {
        fragment,
        preview_document,
    })
}

fn transform<R: StyleResolver>(
    doc: &Document,
    root: NodeId,
    resolver: &R,
) -> Result<(Document, NodeId), anyhow::Error> {
    let (mut work, work_root, mut pairs) = doc.clone_subtree(root);
    strip_disallowed(&mut work, work_root);
    // Stripped nodes drop out of the mirror; the surviving pairs stay
    // aligned with their source counterparts.
    pairs.retain(|(_, work_node)| work.is_attached_under(work_root, *work_node));

    let recognizer = Recognizer::new(doc, root);
    let pass = InlinePass {
        source: doc,
        resolver,
        recognizer: &recognizer,
        export_root: root,
    };
    pass.run(&mut work, &pairs);

    resolve_grid_markers(&mut work, work_root);

    for card in recognizer.secondary_cards() {
        let Some(&(_, work_card)) = pairs.iter().find(|(src, _)| *src == card) else {
            continue;
        };
        let Some(content) = recognizer.card_content(card) else {
            continue;
        };
        let Some(&(_, work_content)) = pairs.iter().find(|(src, _)| *src == content) else {
            continue;
        };
        normalize_card(&mut work, work_card, work_content);
    }

    resolve_row_markers(&mut work, work_root);
    Ok((work, work_root))
}

fn strip_disallowed(doc: &mut Document, root: NodeId) {
    let doomed: Vec<NodeId> = doc
        .descendants(root)
        .skip(1)
        .filter(|node| match doc.node(*node).map(|data| &data.kind) {
            Some(NodeKind::Comment { .. }) => true,
            Some(NodeKind::Element { tag }) => DISALLOWED_TAGS.contains(&tag.as_str()),
            _ => false,
        })
        .collect();
    for node in doomed {
        doc.detach(node);
    }
}

/// Wrap the fragment for local preview. The charset and viewport metas
/// make mobile testing honest; the clipboard payload stays bare because
/// the paste target supplies its own document shell.
fn preview_document(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>Newsletter Preview</title>\n\
         <style>body{{margin:0;padding:0;background-color:#f0f2f5;}}</style>\n\
         </head>\n<body>\n{fragment}\n</body>\n</html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::parse_html;

    #[test]
    fn forced_width_round_trips_existing_declarations() {
        let mut doc = parse_html("<div id=\"x\" style=\"width:720px;color:red;\"></div>");
        let Some(node) = doc.element_by_id(doc.root(), "x") else {
            panic!("node missing");
        };
        let forced = ForcedWidth::apply(&mut doc, node);
        assert_eq!(
            doc.attr(node, "style"),
            Some("width:600px;color:red;max-width:600px;")
        );
        forced.restore(&mut doc);
        assert_eq!(doc.attr(node, "style"), Some("width:720px;color:red;"));
    }

    #[test]
    fn forced_width_removes_declarations_it_introduced() {
        let mut doc = parse_html("<div id=\"x\"></div>");
        let Some(node) = doc.element_by_id(doc.root(), "x") else {
            panic!("node missing");
        };
        let forced = ForcedWidth::apply(&mut doc, node);
        assert!(doc.attr(node, "style").is_some());
        forced.restore(&mut doc);
        assert_eq!(doc.attr(node, "style"), None);
    }

    #[test]
    fn strip_removes_disallowed_elements_and_comments() {
        let mut doc = parse_html(
            "<div id=\"x\"><script>evil()</script><p>keep</p>\
             <!-- editor note --><form><input></form></div>",
        );
        let Some(node) = doc.element_by_id(doc.root(), "x") else {
            panic!("node missing");
        };
        strip_disallowed(&mut doc, node);
        let html = serialize_node(&doc, node);
        assert_eq!(html, "<div id=\"x\"><p>keep</p></div>");
    }
}
