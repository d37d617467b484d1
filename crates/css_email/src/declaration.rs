//! Style declarations — the ordered inline-style builder and the read-only
//! resolved-style map.
//!
//! Spec: <https://www.w3.org/TR/css-style-attr/#interpreting>

use std::collections::HashMap;

/// A single CSS declaration destined for (or parsed from) a `style` attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name normalized to ASCII lowercase as per CSS case-insensitivity.
    pub property: String,
    /// Value trimmed of surrounding ASCII whitespace. May contain spaces.
    pub value: String,
}

/// Parse the value of a `style` attribute into a list of declarations.
///
/// Minimal, resilient parse: splits on semicolons, then on the first colon.
/// Invalid items (no colon, empty property or value) are skipped rather than
/// failing the whole attribute, matching how browsers recover.
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();
    for raw_item in input.split(';') {
        let item = raw_item.trim();
        if item.is_empty() {
            continue;
        }
        let Some((raw_prop, raw_value)) = item.split_once(':') else {
            continue;
        };
        let property_text = raw_prop.trim();
        let value_text = raw_value.trim();
        if property_text.is_empty() || value_text.is_empty() {
            continue;
        }
        out.push(Declaration {
            property: property_text.to_ascii_lowercase(),
            value: value_text.to_owned(),
        });
    }
    out
}

/// An ordered collection of declarations being assembled for one element.
///
/// Setting a property that is already present replaces its value in place,
/// so the serialized attribute never carries duplicate properties; removal
/// is by predicate so shorthand families (`border*`, `padding*`) can be
/// dropped together when their declarations move to a wrapper element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineStyle {
    decls: Vec<Declaration>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self { decls: Vec::new() }
    }

    /// Parse an existing `style` attribute value, keeping source order with
    /// last-wins collapsing of duplicate properties.
    pub fn parse(input: &str) -> Self {
        let mut style = Self::new();
        for decl in parse_style_attribute(input) {
            style.set(&decl.property, &decl.value);
        }
        style
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|decl| decl.property == property)
            .map(|decl| decl.value.as_str())
    }

    /// Set a property, replacing an existing declaration in place.
    pub fn set(&mut self, property: &str, value: &str) {
        if let Some(existing) = self
            .decls
            .iter_mut()
            .find(|decl| decl.property == property)
        {
            existing.value = value.to_owned();
            return;
        }
        self.decls.push(Declaration {
            property: property.to_ascii_lowercase(),
            value: value.to_owned(),
        });
    }

    /// Remove every declaration whose property matches the predicate.
    pub fn remove_where<F: Fn(&str) -> bool>(&mut self, predicate: F) {
        self.decls.retain(|decl| !predicate(&decl.property));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.iter()
    }

    /// Serialize as a `style` attribute value: `prop:value;` per declaration.
    pub fn to_attr_value(&self) -> String {
        let mut out = String::new();
        for decl in &self.decls {
            out.push_str(&decl.property);
            out.push(':');
            out.push_str(&decl.value);
            out.push(';');
        }
        out
    }
}

/// Read-only computed-style map for one element, as the style oracle
/// reported it. Property names are lowercase; values are resolved (colors
/// as `rgb()`/`rgba()`, lengths in px).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedStyle {
    properties: HashMap<String, String>,
}

impl ResolvedStyle {
    pub fn new() -> Self {
        Self {
            properties: HashMap::new(),
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties
            .get(property)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Value of a property, or `""` when absent — mirrors the DOM
    /// `getPropertyValue` contract that callers compare against.
    pub fn get_or_empty(&self, property: &str) -> &str {
        self.get(property).unwrap_or("")
    }

    pub fn insert(&mut self, property: &str, value: &str) {
        self.properties
            .insert(property.to_ascii_lowercase(), value.to_owned());
    }
}

impl FromIterator<(String, String)> for ResolvedStyle {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut style = Self::new();
        for (property, value) in iter {
            style.insert(&property, &value);
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_invalid_items() {
        let decls = parse_style_attribute("color: red; ;broken; font-size:14px;:bad;empty:");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].property, "color");
        assert_eq!(decls[0].value, "red");
        assert_eq!(decls[1].property, "font-size");
        assert_eq!(decls[1].value, "14px");
    }

    #[test]
    fn parse_lowercases_property_names() {
        let decls = parse_style_attribute("COLOR: red");
        assert_eq!(decls[0].property, "color");
    }

    #[test]
    fn set_replaces_in_place() {
        let mut style = InlineStyle::new();
        style.set("display", "block");
        style.set("width", "100%");
        style.set("display", "inline-block");
        assert_eq!(style.to_attr_value(), "display:inline-block;width:100%;");
    }

    #[test]
    fn parse_collapses_duplicates_last_wins() {
        let style = InlineStyle::parse("margin:0;margin:8px;color:red");
        assert_eq!(style.get("margin"), Some("8px"));
        assert_eq!(style.to_attr_value(), "margin:8px;color:red;");
    }

    #[test]
    fn remove_where_drops_families() {
        let mut style = InlineStyle::parse("border:1px solid;border-radius:6px;color:red");
        style.remove_where(|prop| prop.starts_with("border"));
        assert_eq!(style.to_attr_value(), "color:red;");
    }

    #[test]
    fn resolved_style_treats_empty_as_absent() {
        let mut resolved = ResolvedStyle::new();
        resolved.insert("color", "");
        assert_eq!(resolved.get("color"), None);
        assert_eq!(resolved.get_or_empty("color"), "");
    }
}
