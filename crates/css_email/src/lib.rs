//! Email-safe CSS handling — declaration model, property allowlist, and
//! value classification for inlining computed styles into email markup.
//!
//! Webmail sanitizers (Gmail, Naver, Daum, Outlook.com) strip `<style>`
//! blocks and most layout properties, so everything that reaches an email
//! client must be an inline declaration from a known-safe set. This crate
//! owns that set and the rules deciding which resolved values are worth
//! emitting at all.

#![forbid(unsafe_code)]

pub mod declaration;
pub mod length;
pub mod properties;

pub use declaration::{Declaration, InlineStyle, ResolvedStyle, parse_style_attribute};
pub use length::{column_count, compact_font_size, leading_number, parse_px};
pub use properties::{
    EMAIL_SAFE_PROPERTIES, INHERITABLE_PROPERTIES, is_dimension_property, is_global_skip,
    is_inheritable, is_invisible_border, is_transparent_color, is_zero_value,
    names_dimension_axis, skip_default,
};
