//! Bulletproof buttons.
//!
//! Anchor tags render background and padding unreliably across email
//! clients (Naver mail ignores anchor widths outright), while table cells
//! render both everywhere. A recognized call-to-action keeps only its
//! text styling; the box styling moves onto a single-cell wrapper table.

use css_email::properties::is_transparent_color;
use css_email::{InlineStyle, ResolvedStyle};
use dom::{Document, NodeId};

/// Wrap the working anchor in a one-cell presentation table, hoisting the
/// anchor's box declarations onto the table (margin) and its cell
/// (background, border, radius, padding). `style` is the anchor's inline
/// style under construction; the hoisted families are removed from it.
pub(crate) fn apply_bulletproof_button(
    work_doc: &mut Document,
    work: NodeId,
    resolved: &ResolvedStyle,
    style: &mut InlineStyle,
) {
    let margin = resolved.get_or_empty("margin").to_owned();
    let background = resolved.get_or_empty("background-color").to_owned();
    let border = resolved.get_or_empty("border").to_owned();
    let radius = resolved.get_or_empty("border-radius").to_owned();
    let padding = resolved.get_or_empty("padding").to_owned();

    // The anchor keeps text and link styling only.
    style.remove_where(|property| {
        property == "background-color"
            || property.starts_with("border")
            || property.starts_with("padding")
            || property.starts_with("margin")
    });
    style.set("display", "block");
    style.set("text-align", "center");

    let table = work_doc.create_element("table");
    work_doc.set_attr(table, "width", "100%");
    work_doc.set_attr(table, "border", "0");
    work_doc.set_attr(table, "cellspacing", "0");
    work_doc.set_attr(table, "cellpadding", "0");
    work_doc.set_attr(table, "role", "presentation");
    let mut table_style = InlineStyle::new();
    if !margin.is_empty() {
        table_style.set("margin", &margin);
    }
    table_style.set("width", "100%");
    table_style.set("border-collapse", "separate");
    work_doc.set_attr(table, "style", &table_style.to_attr_value());

    let tbody = work_doc.create_element("tbody");
    let row = work_doc.create_element("tr");
    let cell = work_doc.create_element("td");
    work_doc.set_attr(cell, "align", "center");
    work_doc.set_attr(cell, "valign", "middle");
    work_doc.set_attr(cell, "width", "100%");

    let mut cell_style = InlineStyle::new();
    if background.is_empty() || is_transparent_color(&background) {
        cell_style.set("background-color", "transparent");
    } else {
        cell_style.set("background-color", &background);
    }
    if !border.is_empty() && !border.contains("0px none") {
        cell_style.set("border", &border);
    }
    if !radius.is_empty() {
        cell_style.set("border-radius", &radius);
    }
    if !padding.is_empty() {
        cell_style.set("padding", &padding);
    }
    work_doc.set_attr(cell, "style", &cell_style.to_attr_value());

    // Swap the anchor out for the table, then nest it in the cell.
    work_doc.insert_before(work, table);
    work_doc.detach(work);
    work_doc.append_child(row, cell);
    work_doc.append_child(tbody, row);
    work_doc.append_child(table, tbody);
    work_doc.append_child(cell, work);
}
