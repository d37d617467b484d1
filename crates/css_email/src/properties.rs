//! The email-safe property allowlist and the suppression rules deciding
//! which resolved values survive inlining.
//!
//! The allowlist is intentionally closed: Gmail drops `flex`, `grid`,
//! `gap`, and `aspect-ratio` outright, and several webmail sanitizers
//! rewrite anything they do not recognize. Layout is reconstructed with
//! table structures instead of trusting any of these properties.

/// Presentation properties that survive common webmail sanitizers, in the
/// order they are considered (and therefore emitted) per element.
pub const EMAIL_SAFE_PROPERTIES: &[&str] = &[
    "background-color",
    "border",
    "border-radius",
    "border-bottom",
    "border-top",
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "margin",
    "margin-bottom",
    "margin-top",
    "max-width",
    "padding",
    "padding-bottom",
    "padding-top",
    "padding-left",
    "padding-right",
    "text-align",
    "text-decoration",
    "text-transform",
    "width",
    "letter-spacing",
    "overflow",
    "word-break",
    "overflow-wrap",
    "object-fit",
    "min-width",
];

/// Properties whose resolved value is re-declared on every element by the
/// browser but only meaningful when it differs from the parent. Equal
/// values are suppressed so inheritance does the work in the output.
pub const INHERITABLE_PROPERTIES: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "text-align",
    "letter-spacing",
    "word-break",
    "overflow-wrap",
];

/// Per-property resolved defaults that carry no information.
const SKIP_DEFAULTS: &[(&str, &str)] = &[
    ("object-fit", "fill"),
    ("min-width", "0px"),
    ("max-width", "none"),
    ("letter-spacing", "normal"),
    ("text-transform", "none"),
    ("word-break", "normal"),
    ("overflow-wrap", "normal"),
];

/// Sizing properties that would freeze responsive layout if copied from
/// resolved pixel values.
const DIMENSION_PROPERTIES: &[&str] = &[
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
];

/// The documented no-op value for `property`, if it has one.
pub fn skip_default(property: &str) -> Option<&'static str> {
    SKIP_DEFAULTS
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, value)| *value)
}

pub fn is_inheritable(property: &str) -> bool {
    INHERITABLE_PROPERTIES.contains(&property)
}

/// Values that mean "nothing to declare" regardless of property.
pub fn is_global_skip(value: &str) -> bool {
    matches!(value, "initial" | "none" | "normal")
}

/// Zero-equivalent lengths, including the resolved all-zero shorthand.
pub fn is_zero_value(value: &str) -> bool {
    matches!(value, "0px" | "0px 0px 0px 0px" | "0")
}

/// A fully transparent color resolves to `rgba(0, 0, 0, 0)` in every
/// engine, but parse rather than string-match so keyword and functional
/// spellings are treated alike.
pub fn is_transparent_color(value: &str) -> bool {
    csscolorparser::parse(value)
        .map(|color| color.to_rgba8()[3] == 0)
        .unwrap_or(false)
}

/// Border shorthands whose resolved value denotes no visible border.
pub fn is_invisible_border(property: &str, value: &str) -> bool {
    property.starts_with("border")
        && (value.contains("0px none") || value.contains("none 0px") || value.contains("transparent"))
}

/// Whether `property` belongs to the width/height sizing family.
pub fn is_dimension_property(property: &str) -> bool {
    DIMENSION_PROPERTIES.contains(&property)
}

/// Whether the property NAME contains a `width`/`height` token. Naver and
/// Daum strip those substrings out of anchor style attributes, turning
/// `line-height:22px` into `line-:22px` and invalidating the whole string,
/// so anchors must not carry any such property.
pub fn names_dimension_axis(property: &str) -> bool {
    property.contains("width") || property.contains("height")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist_is_closed_over_skip_defaults() {
        for (property, _) in SKIP_DEFAULTS {
            assert!(EMAIL_SAFE_PROPERTIES.contains(property));
        }
    }

    #[test]
    fn transparent_colors() {
        assert!(is_transparent_color("rgba(0, 0, 0, 0)"));
        assert!(is_transparent_color("transparent"));
        assert!(!is_transparent_color("rgb(255, 255, 255)"));
        assert!(!is_transparent_color("#00000001"));
        assert!(!is_transparent_color("not-a-color"));
    }

    #[test]
    fn invisible_borders() {
        assert!(is_invisible_border("border", "0px none rgb(0, 0, 0)"));
        assert!(is_invisible_border("border-top", "medium none transparent"));
        assert!(!is_invisible_border("border", "1px solid rgb(20, 20, 20)"));
        assert!(!is_invisible_border("padding", "0px none"));
    }

    #[test]
    fn dimension_axis_naming_catches_line_height() {
        assert!(names_dimension_axis("line-height"));
        assert!(names_dimension_axis("min-width"));
        assert!(!names_dimension_axis("overflow-wrap"));
    }

    #[test]
    fn zero_values() {
        assert!(is_zero_value("0px"));
        assert!(is_zero_value("0px 0px 0px 0px"));
        assert!(!is_zero_value("0px 8px"));
    }
}
