//! Display-mode classification.
//!
//! Email clients honor none of `grid`/`flex`, so both become
//! `display:block;width:100%` inline, plus a transient marker attribute
//! that the hybrid-layout pass turns into table structure. Everything
//! else gets a conservative display declaration only where omitting one
//! would change rendering.

use crate::schema::Recognizer;
use css_email::{InlineStyle, ResolvedStyle, column_count, leading_number};
use dom::{Document, NodeId};

/// Marker attributes bridging pass 1 and pass 2. Never present in output.
pub(crate) const MARKER_COLS: &str = "data-email-cols";
pub(crate) const MARKER_GAP: &str = "data-email-gap";
pub(crate) const MARKER_ROW: &str = "data-email-row";
pub(crate) const MARKER_ALIGN: &str = "data-email-align";

pub(crate) const ALIGN_SPLIT: &str = "split";
pub(crate) const ALIGN_HEADLINE: &str = "headline";

/// Tags that are block-level by default; injecting `display:block` on
/// them would only add bytes.
const BLOCK_TAGS: &[&str] = &[
    "div", "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "li", "section", "article", "header",
    "footer",
];

/// Gap between tracks, read from `gap` with `column-gap` as fallback,
/// truncated to whole pixels.
fn resolved_gap(resolved: &ResolvedStyle) -> i32 {
    let raw = resolved
        .get("gap")
        .or_else(|| resolved.get("column-gap"))
        .unwrap_or("");
    leading_number(raw).map_or(0, |gap| gap as i32)
}

/// Classify one node pair, pushing display declarations into `style` and
/// marker attributes onto the working node.
pub(crate) fn classify_display(
    source: &Document,
    src: NodeId,
    work_doc: &mut Document,
    work: NodeId,
    resolved: &ResolvedStyle,
    recognizer: &Recognizer<'_>,
    style: &mut InlineStyle,
) {
    let display = resolved.get_or_empty("display");
    let tag = work_doc.tag(work).unwrap_or("").to_owned();

    if display.contains("grid") {
        let columns = column_count(resolved.get_or_empty("grid-template-columns"));
        if columns > 1 {
            work_doc.set_attr(work, MARKER_COLS, &columns.to_string());
            work_doc.set_attr(work, MARKER_GAP, &resolved_gap(resolved).to_string());
        }
        style.set("display", "block");
        style.set("width", "100%");
    } else if display == "flex" || display == "inline-flex" {
        let direction = resolved.get_or_empty("flex-direction");
        let row_like = direction != "column" && direction != "column-reverse";
        if row_like && source.child_elements(src).len() > 1 {
            work_doc.set_attr(work, MARKER_ROW, "true");
            work_doc.set_attr(work, MARKER_GAP, &resolved_gap(resolved).to_string());
            if recognizer.is_two_part_header(src) {
                work_doc.set_attr(work, MARKER_ALIGN, ALIGN_SPLIT);
            }
            if recognizer.is_headline_row(src) {
                work_doc.set_attr(work, MARKER_ALIGN, ALIGN_HEADLINE);
            }
        }
        style.set("display", "block");
        style.set("width", "100%");
    } else if display == "inline" || display == "inline-block" {
        style.set("display", display);
    } else if !BLOCK_TAGS.contains(&tag.as_str()) {
        style.set("display", "block");
    }
}
