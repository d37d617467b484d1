//! Equal-height card normalization.
//!
//! Without flexbox there is no email-safe way to stretch sibling cards to
//! the same height and pin their action row to the bottom. The closest
//! table-based equivalent: rebuild each secondary card's content block as
//! a single-column table where every former child is a row, and
//! bottom-align the last row (the call-to-action) with breathing room
//! above it.

use css_email::InlineStyle;
use dom::{Document, NodeId};

fn append_style(doc: &mut Document, node: NodeId, set: &[(&str, &str)]) {
    let mut style = InlineStyle::parse(doc.attr(node, "style").unwrap_or(""));
    for (property, value) in set {
        style.set(property, value);
    }
    doc.set_attr(node, "style", &style.to_attr_value());
}

/// Rebuild one secondary card. `content` is the card's content block on
/// the working tree; callers resolve it through the structural schema.
pub(crate) fn normalize_card(doc: &mut Document, card: NodeId, content: NodeId) {
    append_style(doc, card, &[("height", "100%")]);
    append_style(doc, content, &[("height", "100%")]);

    let children = doc.child_elements(content);
    if children.is_empty() {
        return;
    }

    let detachable: Vec<NodeId> = doc.children(content).collect();
    for node in detachable {
        doc.detach(node);
    }

    let table = doc.create_element("table");
    doc.set_attr(table, "role", "presentation");
    doc.set_attr(table, "width", "100%");
    doc.set_attr(table, "cellpadding", "0");
    doc.set_attr(table, "cellspacing", "0");
    doc.set_attr(table, "border", "0");
    doc.set_attr(
        table,
        "style",
        "width:100%;height:100%;border-collapse:collapse;",
    );

    let last = children.len() - 1;
    for (index, child) in children.iter().enumerate() {
        let row = doc.create_element("tr");
        let cell = doc.create_element("td");
        if index == last {
            doc.set_attr(cell, "style", "vertical-align:bottom;padding-top:12px;");
        } else {
            doc.set_attr(cell, "style", "vertical-align:top;");
        }
        doc.append_child(cell, *child);
        doc.append_child(row, cell);
        doc.append_child(table, row);
    }

    doc.append_child(content, table);
}
