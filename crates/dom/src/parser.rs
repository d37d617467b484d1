//! HTML5 parsing using html5ever.

use crate::tree::Document;
use html5ever::tendril::TendrilSink as _;
use html5ever::{ParseOpts, parse_document};
use indextree::NodeId;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Parse an HTML string into a [`Document`].
///
/// html5ever recovers from any input, so this cannot fail; fragments get
/// the standard html/head/body scaffolding, which callers navigate past
/// with id lookups. Doctype and processing instructions are dropped, as
/// are whitespace-only text nodes.
pub fn parse_html(html: &str) -> Document {
    let rc_dom: RcDom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
    let mut doc = Document::new();
    let root = doc.root();
    convert_node(&rc_dom.document, root, &mut doc);
    log::debug!(target: "dom", "parsed {} bytes of markup", html.len());
    doc
}

fn convert_node(rc_node: &Handle, parent: NodeId, doc: &mut Document) {
    match &rc_node.data {
        RcNodeData::Document => {
            for child in rc_node.children.borrow().iter() {
                convert_node(child, parent, doc);
            }
        }

        RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {}

        RcNodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if text.trim().is_empty() {
                return;
            }
            let node = doc.create_text(&text);
            doc.append_child(parent, node);
        }

        RcNodeData::Comment { contents } => {
            let node = doc.create_comment(&contents.to_string());
            doc.append_child(parent, node);
        }

        RcNodeData::Element { name, attrs, .. } => {
            let node = doc.create_element(&name.local.to_string());
            for attr in attrs.borrow().iter() {
                doc.set_attr(node, &attr.name.local.to_string(), &attr.value.to_string());
            }
            doc.append_child(parent, node);
            for child in rc_node.children.borrow().iter() {
                convert_node(child, node, doc);
            }
        }
    }
}
