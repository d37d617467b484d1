//! Pass 2: resolve layout markers into email-renderable structure.
//!
//! Multi-column grids become fluid-hybrid layouts: inline-block column
//! wrappers for modern clients, plus an Outlook-conditional ghost table
//! (`<!--[if mso | IE]> ... <![endif]-->`) for the Word rendering engine,
//! which ignores inline-block. Row-flex containers become single-row
//! presentation tables. Markers are attributes written by pass 1 and are
//! always removed here, transformed or not.

use crate::classify::{ALIGN_HEADLINE, ALIGN_SPLIT, MARKER_ALIGN, MARKER_COLS, MARKER_GAP, MARKER_ROW};
use css_email::InlineStyle;
use dom::{Document, NodeId};
use log::debug;

/// Fixed container width the column math is based on.
const CONTAINER_WIDTH_PX: i32 = 600;
/// Column spacing is clamped to this range: a readability floor and a
/// visual ceiling, regardless of the source gap.
const MIN_COLUMN_SPACING_PX: i32 = 12;
const MAX_COLUMN_SPACING_PX: i32 = 20;
/// Row-cell gaps wider than this read as broken alignment in mail clients.
const MAX_ROW_GAP_PX: i32 = 8;
/// Width of the ordinal cell in ranked headline rows.
const HEADLINE_ORDINAL_WIDTH_PX: i32 = 36;

fn marker_int(doc: &Document, node: NodeId, name: &str) -> Option<i32> {
    doc.attr(node, name).and_then(|value| value.parse().ok())
}

fn append_style(doc: &mut Document, node: NodeId, set: &[(&str, &str)]) {
    let mut style = InlineStyle::parse(doc.attr(node, "style").unwrap_or(""));
    for (property, value) in set {
        style.set(property, value);
    }
    doc.set_attr(node, "style", &style.to_attr_value());
}

/// Rewrite every grid-marked container into a fluid-hybrid column layout.
pub(crate) fn resolve_grid_markers(doc: &mut Document, root: NodeId) {
    let marked: Vec<NodeId> = doc
        .elements_in(root)
        .into_iter()
        .filter(|node| doc.attr(*node, MARKER_COLS).is_some())
        .collect();
    for wrapper in marked {
        let columns = marker_int(doc, wrapper, MARKER_COLS).unwrap_or(1).max(1);
        let gap = marker_int(doc, wrapper, MARKER_GAP).unwrap_or(0);
        doc.remove_attr(wrapper, MARKER_COLS);
        doc.remove_attr(wrapper, MARKER_GAP);
        build_hybrid_columns(doc, wrapper, columns, gap);
    }
}

fn build_hybrid_columns(doc: &mut Document, wrapper: NodeId, columns: i32, gap: i32) {
    let children = doc.child_elements(wrapper);
    if children.is_empty() {
        return;
    }
    debug!(
        target: "transcoder",
        "hybrid columns: {} children in {} columns, gap {}",
        children.len(),
        columns,
        gap
    );

    // font-size:0 kills the whitespace gaps between inline-block columns.
    append_style(
        doc,
        wrapper,
        &[
            ("text-align", "center"),
            ("font-size", "0"),
            ("direction", "ltr"),
            ("white-space", "normal"),
        ],
    );

    let spacing = gap.clamp(MIN_COLUMN_SPACING_PX, MAX_COLUMN_SPACING_PX);
    let column_width = CONTAINER_WIDTH_PX / columns;
    // Symmetric horizontal padding keeps columns aligned when they stack
    // on mobile; the full spacing as bottom padding keeps wrapped rows
    // evenly separated.
    let h_pad = (spacing + 1) / 2;
    let bottom_pad = spacing;
    let cell_padding = format!("0 {h_pad}px {bottom_pad}px {h_pad}px");

    let detachable: Vec<NodeId> = doc.children(wrapper).collect();
    for node in detachable {
        doc.detach(node);
    }

    let ghost_open = doc.create_comment(
        "[if mso | IE]><table role=\"presentation\" border=\"0\" cellpadding=\"0\" cellspacing=\"0\" width=\"100%\"><tr><![endif]",
    );
    doc.append_child(wrapper, ghost_open);

    for (index, child) in children.iter().enumerate() {
        if index > 0 && index % columns as usize == 0 {
            let ghost_row = doc.create_comment("[if mso | IE]></tr><tr><![endif]");
            doc.append_child(wrapper, ghost_row);
        }

        let ghost_cell = doc.create_comment(&format!(
            "[if mso | IE]><td style=\"vertical-align:top; width:{column_width}px; padding:{cell_padding};\"><![endif]"
        ));
        doc.append_child(wrapper, ghost_cell);

        let column = doc.create_element("div");
        doc.set_attr(
            column,
            "style",
            &format!(
                "width:100%;max-width:{column_width}px;display:inline-block;vertical-align:top;direction:ltr;font-size:14px;box-sizing:border-box;padding:{cell_padding};"
            ),
        );
        append_style(doc, *child, &[("width", "100%"), ("max-width", "100%")]);
        doc.append_child(column, *child);
        doc.append_child(wrapper, column);

        let ghost_cell_close = doc.create_comment("[if mso | IE]></td><![endif]");
        doc.append_child(wrapper, ghost_cell_close);
    }

    let ghost_close = doc.create_comment("[if mso | IE]></tr></table><![endif]");
    doc.append_child(wrapper, ghost_close);
}

/// Rewrite every row-marked container into a single-row table.
pub(crate) fn resolve_row_markers(doc: &mut Document, root: NodeId) {
    let marked: Vec<NodeId> = doc
        .elements_in(root)
        .into_iter()
        .filter(|node| doc.attr(*node, MARKER_ROW).is_some())
        .collect();
    for wrapper in marked {
        let gap = marker_int(doc, wrapper, MARKER_GAP).unwrap_or(0);
        let align = doc.attr(wrapper, MARKER_ALIGN).map(str::to_owned);
        doc.remove_attr(wrapper, MARKER_ROW);
        doc.remove_attr(wrapper, MARKER_GAP);
        doc.remove_attr(wrapper, MARKER_ALIGN);
        build_row_table(doc, wrapper, gap, align.as_deref());
    }
}

fn build_row_table(doc: &mut Document, wrapper: NodeId, gap: i32, align: Option<&str>) {
    let children = doc.child_elements(wrapper);
    if children.is_empty() {
        return;
    }

    let detachable: Vec<NodeId> = doc.children(wrapper).collect();
    for node in detachable {
        doc.detach(node);
    }

    let table = doc.create_element("table");
    doc.set_attr(table, "role", "presentation");
    doc.set_attr(table, "width", "100%");
    doc.set_attr(table, "cellpadding", "0");
    doc.set_attr(table, "cellspacing", "0");
    doc.set_attr(table, "border", "0");
    doc.set_attr(table, "style", "width:100%;border-collapse:collapse;");
    let row = doc.create_element("tr");

    let last = children.len() - 1;
    for (index, child) in children.iter().enumerate() {
        let cell = doc.create_element("td");
        doc.set_attr(cell, "valign", "middle");
        let mut cell_style = InlineStyle::new();
        cell_style.set("vertical-align", "middle");
        if index > 0 && gap > 0 {
            cell_style.set("padding-left", &format!("{}px", gap.min(MAX_ROW_GAP_PX)));
        }

        match align {
            // Two-part header: the first cell swallows the row width,
            // pushing the badge cell hard right.
            Some(ALIGN_SPLIT) => {
                if index == 0 {
                    doc.set_attr(cell, "width", "100%");
                }
                if index == last {
                    cell_style.set("text-align", "right");
                    cell_style.set("white-space", "nowrap");
                }
            }
            // Ranked headline: fixed ordinal slot, text takes the rest.
            Some(ALIGN_HEADLINE) if index == 0 => {
                doc.set_attr(cell, "width", &HEADLINE_ORDINAL_WIDTH_PX.to_string());
                cell_style.set("width", &format!("{HEADLINE_ORDINAL_WIDTH_PX}px"));
                cell_style.set("text-align", "center");
                let target = doc.find_descendant_tag(*child, "span").unwrap_or(*child);
                append_style(doc, target, &[("text-align", "center")]);
            }
            _ => {}
        }

        doc.set_attr(cell, "style", &cell_style.to_attr_value());
        doc.append_child(cell, *child);
        doc.append_child(row, cell);
    }

    doc.append_child(table, row);
    doc.append_child(wrapper, table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{parse_html, serialize_node};

    fn marked_grid(children: usize, cols: i32, gap: i32) -> (Document, NodeId) {
        let mut doc = Document::new();
        let wrapper = doc.create_element("div");
        doc.set_attr(wrapper, MARKER_COLS, &cols.to_string());
        doc.set_attr(wrapper, MARKER_GAP, &gap.to_string());
        for index in 0..children {
            let card = doc.create_element("div");
            let text = doc.create_text(&format!("card {index}"));
            doc.append_child(card, text);
            doc.append_child(wrapper, card);
        }
        let root = doc.root();
        doc.append_child(root, wrapper);
        (doc, wrapper)
    }

    #[test]
    fn grid_clamps_spacing_and_floors_column_width() {
        let (mut doc, wrapper) = marked_grid(6, 3, 24);
        resolve_grid_markers(&mut doc, wrapper);
        let html = serialize_node(&doc, wrapper);
        // gap 24 clamps to 20; floor(600/3) = 200; half-spacing 10.
        assert!(html.contains("max-width:200px"));
        assert!(html.contains("padding:0 10px 20px 10px;"));
        // One ghost row start for the initial row plus one per wrap of 3.
        assert_eq!(html.matches("<tr>").count(), 2);
        assert_eq!(doc.attr(wrapper, MARKER_COLS), None);
        assert_eq!(doc.attr(wrapper, MARKER_GAP), None);
    }

    #[test]
    fn grid_spacing_has_a_readability_floor() {
        let (mut doc, wrapper) = marked_grid(2, 2, 0);
        resolve_grid_markers(&mut doc, wrapper);
        let html = serialize_node(&doc, wrapper);
        assert!(html.contains("padding:0 6px 12px 6px;"));
    }

    #[test]
    fn grid_children_keep_document_order() {
        let (mut doc, wrapper) = marked_grid(4, 2, 16);
        resolve_grid_markers(&mut doc, wrapper);
        let html = serialize_node(&doc, wrapper);
        let positions: Vec<usize> = (0..4)
            .map(|index| {
                html.find(&format!("card {index}"))
                    .map_or(usize::MAX, |position| position)
            })
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn empty_marked_container_is_left_alone() {
        let (mut doc, wrapper) = marked_grid(0, 3, 16);
        resolve_grid_markers(&mut doc, wrapper);
        assert_eq!(doc.attr(wrapper, MARKER_COLS), None);
        assert_eq!(serialize_node(&doc, wrapper), "<div></div>");
    }

    #[test]
    fn row_marker_builds_single_row_table() {
        let doc_markup = "<div id=\"row\" data-email-row=\"true\" data-email-gap=\"12\">\
             <h2>Section</h2><span>badge</span></div>";
        let mut doc = parse_html(doc_markup);
        let Some(wrapper) = doc.element_by_id(doc.root(), "row") else {
            panic!("wrapper missing");
        };
        resolve_row_markers(&mut doc, wrapper);
        let html = serialize_node(&doc, wrapper);
        assert!(html.contains("<table role=\"presentation\""));
        // Gap is capped at 8 and becomes left padding after the first cell.
        assert!(html.contains("padding-left:8px;"));
        assert_eq!(html.matches("<td").count(), 2);
        assert!(!html.contains(MARKER_ROW));
    }

    #[test]
    fn split_alignment_pushes_last_cell_right() {
        let markup = "<div id=\"row\" data-email-row=\"true\" data-email-gap=\"8\" \
             data-email-align=\"split\"><h2>Schedule</h2><span>2 weeks</span></div>";
        let mut doc = parse_html(markup);
        let Some(wrapper) = doc.element_by_id(doc.root(), "row") else {
            panic!("wrapper missing");
        };
        resolve_row_markers(&mut doc, wrapper);
        let html = serialize_node(&doc, wrapper);
        assert!(html.contains("<td valign=\"middle\" width=\"100%\""));
        assert!(html.contains("text-align:right;white-space:nowrap;"));
    }

    #[test]
    fn headline_alignment_fixes_the_ordinal_cell() {
        let markup = "<div id=\"row\" data-email-row=\"true\" data-email-gap=\"10\" \
             data-email-align=\"headline\"><div><span>3</span></div><a href=\"#\">Story</a></div>";
        let mut doc = parse_html(markup);
        let Some(wrapper) = doc.element_by_id(doc.root(), "row") else {
            panic!("wrapper missing");
        };
        resolve_row_markers(&mut doc, wrapper);
        let html = serialize_node(&doc, wrapper);
        assert!(html.contains("width=\"36\""));
        assert!(html.contains("width:36px;text-align:center;"));
        assert_eq!(html.matches("width=\"36\"").count(), 1);
        // The ordinal span itself is centered too.
        assert!(html.contains("<span style=\"text-align:center;\">3</span>"));
    }
}
