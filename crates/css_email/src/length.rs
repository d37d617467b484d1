//! Pixel-length parsing for resolved values.
//!
//! Resolved styles report lengths in `px`, so only that unit (plus the
//! unitless zero) needs to round-trip here.
//! Spec: <https://www.w3.org/TR/css-values-3/#lengths>

use cssparser::{Parser, ParserInput, Token};

/// Font sizes above this threshold are scaled down for email compactness.
const FONT_COMPACT_THRESHOLD_PX: f32 = 20.0;
/// Scale factor applied to oversized font sizes.
const FONT_COMPACT_FACTOR: f32 = 0.85;

/// Parse a resolved `<length>` in pixels. Accepts `NNpx` and unitless zero.
pub fn parse_px(value: &str) -> Option<f32> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    match parser.next() {
        Ok(token) => match token.clone() {
            Token::Dimension { value, unit, .. } => {
                if unit.as_ref().eq_ignore_ascii_case("px") {
                    Some(value)
                } else {
                    None
                }
            }
            Token::Number { value: 0.0, .. } => Some(0.0),
            _ => None,
        },
        Err(_) => None,
    }
}

/// The leading numeric magnitude of a resolved value, unit ignored.
/// Used for counting positive grid track widths and reading gaps.
pub fn leading_number(value: &str) -> Option<f32> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    match parser.next() {
        Ok(token) => match token.clone() {
            Token::Dimension { value, .. }
            | Token::Number { value, .. }
            | Token::Percentage {
                unit_value: value, ..
            } => Some(value),
            _ => None,
        },
        Err(_) => None,
    }
}

/// Scale an oversized font size down by the compaction factor. Returns the
/// rewritten value only when scaling applied; callers keep the original
/// value otherwise.
pub fn compact_font_size(value: &str) -> Option<String> {
    let px = parse_px(value)?;
    if px > FONT_COMPACT_THRESHOLD_PX {
        Some(format!("{}px", (px * FONT_COMPACT_FACTOR).round() as i32))
    } else {
        None
    }
}

/// Number of positive-width tracks in a resolved `grid-template-columns`
/// value (a whitespace-separated px list once the browser has resolved it).
pub fn column_count(template: &str) -> usize {
    template
        .split_whitespace()
        .filter(|track| leading_number(track).is_some_and(|width| width > 0.0))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_px_lengths() {
        assert_eq!(parse_px("24px"), Some(24.0));
        assert_eq!(parse_px("0"), Some(0.0));
        assert_eq!(parse_px("1.5px"), Some(1.5));
        assert_eq!(parse_px("2em"), None);
        assert_eq!(parse_px("normal"), None);
    }

    #[test]
    fn compacts_only_oversized_fonts() {
        assert_eq!(compact_font_size("24px"), Some("20px".to_owned()));
        assert_eq!(compact_font_size("32px"), Some("27px".to_owned()));
        assert_eq!(compact_font_size("20px"), None);
        assert_eq!(compact_font_size("14px"), None);
        assert_eq!(compact_font_size("large"), None);
    }

    #[test]
    fn counts_positive_columns() {
        assert_eq!(column_count("200px 200px 200px"), 3);
        assert_eq!(column_count("0px 300px"), 1);
        assert_eq!(column_count("none"), 0);
        assert_eq!(column_count(""), 0);
    }
}
