//! Pass 1: inline every email-safe resolved style onto the working tree.
//!
//! Each working node is paired with its source counterpart; the source is
//! only ever read (through the style oracle), the working node receives a
//! full replacement `style` attribute. Layout-incompatible containers are
//! tagged for the hybrid pass; structural recognitions normalize card,
//! icon, and schedule styling so heterogeneous source markup stacks
//! cleanly in a single-column email.

use crate::buttons::apply_bulletproof_button;
use crate::classify::classify_display;
use crate::resolver::StyleResolver;
use crate::schema::{CardPart, Recognizer};
use css_email::properties::{
    EMAIL_SAFE_PROPERTIES, is_dimension_property, is_global_skip, is_inheritable,
    is_invisible_border, is_transparent_color, is_zero_value, names_dimension_axis, skip_default,
};
use css_email::{InlineStyle, ResolvedStyle, compact_font_size};
use dom::{Document, NodeId};
use log::warn;

/// Fixed layout width emails are built against.
const TARGET_WIDTH_PX: f32 = 600.0;

pub(crate) struct InlinePass<'a, R: StyleResolver> {
    pub source: &'a Document,
    pub resolver: &'a R,
    pub recognizer: &'a Recognizer<'a>,
    /// Source-side export root; its working twin gets the container style.
    pub export_root: NodeId,
}

impl<R: StyleResolver> InlinePass<'_, R> {
    /// Run the pass over the source→working element pairs in document order.
    pub fn run(&self, work_doc: &mut Document, pairs: &[(NodeId, NodeId)]) {
        for &(src, work) in pairs {
            if !self.source.is_element(src) {
                continue;
            }
            self.inline_node(work_doc, src, work);
        }
    }

    fn inline_node(&self, work_doc: &mut Document, src: NodeId, work: NodeId) {
        // A working node without a usable oracle entry is left as-is
        // rather than failing the export.
        let Some(resolved) = self.resolver.resolve(src) else {
            warn!(target: "transcoder", "no resolved style for node, leaving it unstyled");
            return;
        };
        let Some(tag) = work_doc.tag(work).map(str::to_owned) else {
            return;
        };

        let mut style = InlineStyle::new();
        classify_display(
            self.source,
            src,
            work_doc,
            work,
            resolved,
            self.recognizer,
            &mut style,
        );

        let parent_resolved = self
            .source
            .parent(src)
            .filter(|parent| self.source.is_element(*parent))
            .and_then(|parent| self.resolver.resolve(parent));

        self.apply_allowlist(&tag, resolved, parent_resolved, &mut style);

        if src == self.export_root {
            style.set("width", "100%");
            style.set("max-width", "600px");
            style.set("margin", "0 auto");
        }

        if tag == "img" {
            self.size_image(work_doc, work, src, &mut style);
        }

        copy_background(resolved, &mut style);
        protect_overflow(&tag, &mut style);
        if self.recognizer.clips_overflow(src) {
            style.set("overflow", "hidden");
        }

        self.normalize_structures(work_doc, src, work, resolved, &mut style);

        if self.recognizer.is_call_to_action(src, resolved) {
            apply_bulletproof_button(work_doc, work, resolved, &mut style);
        }

        if !style.is_empty() {
            work_doc.set_attr(work, "style", &style.to_attr_value());
        }
        work_doc.remove_attr(work, "class");
    }

    /// The allowlist filter with its suppression rules, applied in order.
    /// Each rule independently drops the property.
    fn apply_allowlist(
        &self,
        tag: &str,
        resolved: &ResolvedStyle,
        parent_resolved: Option<&ResolvedStyle>,
        style: &mut InlineStyle,
    ) {
        for &property in EMAIL_SAFE_PROPERTIES {
            let Some(value) = resolved.get(property) else {
                continue;
            };
            if skip_default(property) == Some(value) {
                continue;
            }
            if is_global_skip(value) {
                continue;
            }
            if is_zero_value(value) {
                continue;
            }
            if is_transparent_color(value) {
                continue;
            }
            if is_invisible_border(property, value) {
                continue;
            }
            // Re-declaring an inherited value only adds bytes.
            if is_inheritable(property)
                && parent_resolved.is_some_and(|parent| parent.get_or_empty(property) == value)
            {
                continue;
            }
            // Korean webmail clients mangle width/height tokens inside
            // anchor style attributes; anchors carry none of them.
            if tag == "a" && names_dimension_axis(property) {
                continue;
            }
            // Resolved pixel dimensions freeze responsive layout; the
            // hybrid tables own sizing for everything but images.
            if is_dimension_property(property) && value.contains("px") && tag != "img" {
                continue;
            }
            if property == "font-size" {
                if let Some(scaled) = compact_font_size(value) {
                    style.set(property, &scaled);
                    continue;
                }
            }
            style.set(property, value);
        }
    }

    /// Images get an explicit width attribute so clients reserve space
    /// before the image loads.
    fn size_image(&self, work_doc: &mut Document, work: NodeId, src: NodeId, style: &mut InlineStyle) {
        let Some(width) = self.resolver.rendered_width(src) else {
            return;
        };
        if width <= 0.0 {
            return;
        }
        let capped = width.min(TARGET_WIDTH_PX).round() as i32;
        work_doc.set_attr(work, "width", &capped.to_string());
        style.set("width", "100%");
        style.set("max-width", &format!("{}px", width.round() as i32));
        style.set("height", "auto");
    }

    fn normalize_structures(
        &self,
        work_doc: &mut Document,
        src: NodeId,
        work: NodeId,
        resolved: &ResolvedStyle,
        style: &mut InlineStyle,
    ) {
        match self.recognizer.card_part_of(src) {
            Some((CardPart::Media, false)) => {
                style.set("width", "100%");
                style.set("height", "160px");
                style.set("overflow", "hidden");
                style.set("background-color", "#f8f9fa");
            }
            Some((CardPart::Media, true)) => {
                style.set("width", "100%");
                style.set("max-height", "200px");
                style.set("overflow", "hidden");
                style.set("background-color", "#f8f9fa");
            }
            Some((CardPart::Title, featured)) => {
                if featured {
                    style.set("font-size", "16px");
                    style.set("font-weight", "600");
                } else {
                    style.set("height", "48px");
                }
                style.set("line-height", "24px");
                style.set("margin-bottom", "8px");
                clamp_two_lines(style);
            }
            Some((CardPart::Excerpt, featured)) => {
                if featured {
                    style.set("font-size", "14px");
                } else {
                    style.set("height", "44px");
                }
                style.set("line-height", "22px");
                style.set("margin-bottom", "12px");
                clamp_two_lines(style);
            }
            Some((CardPart::Content, true)) => style.set("padding", "16px"),
            _ => {}
        }

        if let Some(featured) = self.recognizer.is_media_image(src) {
            style.set("width", "100%");
            style.set("height", "auto");
            style.set("display", "block");
            style.set("object-fit", "cover");
            if featured {
                style.set("max-height", "200px");
            } else {
                style.set("height", "160px");
            }
            work_doc.remove_attr(work, "height");
        }

        if self.recognizer.is_crypto_icon(src) {
            style.set("width", "32px");
            style.set("height", "32px");
            style.set("border-radius", "50%");
            style.set("object-fit", "cover");
            work_doc.set_attr(work, "width", "32");
            work_doc.set_attr(work, "height", "32");
        }

        if self.recognizer.is_schedule_list(src) {
            style.set("padding", "12px");
        }
        if self.recognizer.is_schedule_item(src) {
            style.set("padding", "12px");
            style.set("margin-bottom", "4px");
        }
        let parent_display = self
            .source
            .parent(src)
            .and_then(|parent| self.resolver.resolve(parent))
            .map_or("", |parent| parent.get_or_empty("display"));
        if self.recognizer.is_schedule_column(src, parent_display) {
            style.set("margin-bottom", "16px");
        }
        if self.recognizer.is_schedule_badge(src, resolved) {
            style.set("width", "fit-content");
        }
    }
}

/// Two-line clamp used for card titles and excerpts so stacked cards keep
/// uniform text blocks.
fn clamp_two_lines(style: &mut InlineStyle) {
    style.set("display", "-webkit-box");
    style.set("-webkit-line-clamp", "2");
    style.set("-webkit-box-orient", "vertical");
    style.set("overflow", "hidden");
    style.set("text-overflow", "ellipsis");
}

/// Background images are not expressible through any safe shorthand and
/// are copied verbatim with their companion properties.
fn copy_background(resolved: &ResolvedStyle, style: &mut InlineStyle) {
    let Some(image) = resolved.get("background-image") else {
        return;
    };
    if image == "none" {
        return;
    }
    style.set("background-image", image);
    if let Some(size) = resolved.get("background-size") {
        style.set("background-size", size);
    }
    if let Some(position) = resolved.get("background-position") {
        style.set("background-position", position);
    }
    if let Some(repeat) = resolved.get("background-repeat") {
        style.set("background-repeat", repeat);
    }
    if let Some(color) = resolved.get("background-color") {
        if !is_transparent_color(color) {
            style.set("background-color", color);
        }
    }
}

/// Long words and URLs must not overflow the fixed-width layout.
fn protect_overflow(tag: &str, style: &mut InlineStyle) {
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "p" | "span" | "div" => {
            style.set("word-break", "keep-all");
            style.set("overflow-wrap", "break-word");
        }
        "a" => {
            style.set("word-break", "break-all");
            style.set("overflow-wrap", "break-word");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_protection_by_tag() {
        let mut style = InlineStyle::new();
        protect_overflow("h2", &mut style);
        assert_eq!(style.get("word-break"), Some("keep-all"));

        let mut style = InlineStyle::new();
        protect_overflow("a", &mut style);
        assert_eq!(style.get("word-break"), Some("break-all"));
        assert_eq!(style.get("overflow-wrap"), Some("break-word"));

        let mut style = InlineStyle::new();
        protect_overflow("img", &mut style);
        assert!(style.is_empty());
    }

    #[test]
    fn background_family_copied_verbatim() {
        let mut resolved = ResolvedStyle::new();
        resolved.insert("background-image", "url(\"https://cdn/img.png\")");
        resolved.insert("background-size", "cover");
        resolved.insert("background-color", "rgba(0, 0, 0, 0)");
        let mut style = InlineStyle::new();
        copy_background(&resolved, &mut style);
        assert_eq!(
            style.get("background-image"),
            Some("url(\"https://cdn/img.png\")")
        );
        assert_eq!(style.get("background-size"), Some("cover"));
        assert_eq!(style.get("background-color"), None);
    }

    #[test]
    fn background_none_is_ignored() {
        let mut resolved = ResolvedStyle::new();
        resolved.insert("background-image", "none");
        resolved.insert("background-size", "auto");
        let mut style = InlineStyle::new();
        copy_background(&resolved, &mut style);
        assert!(style.is_empty());
    }
}
