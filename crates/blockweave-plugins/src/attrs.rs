//! Small helpers shared by the plugin parsers and serializers.

use blockweave_engine::html::HtmlElement;
use blockweave_engine::{ElementRef, Properties};
use serde_json::Value;

/// Copy HTML attributes into properties, renaming as `(attr, property)`.
/// Numeric attributes (`width`, `height`) are stored as numbers.
pub fn attrs_to_props(el: &HtmlElement, pairs: &[(&str, &str)]) -> Properties {
    pairs
        .iter()
        .filter_map(|(attr, prop)| {
            let value = el.attr(attr)?;
            let value = match value.trim().parse::<u64>() {
                Ok(n) if matches!(*attr, "width" | "height") => Value::from(n),
                _ => Value::from(value),
            };
            Some((prop.to_string(), value))
        })
        .collect()
}

/// ` name="value"` with the value escaped, or nothing when absent.
pub fn attr(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!(
            " {name}=\"{}\"",
            html_escape::encode_double_quoted_attribute(value)
        ),
        None => String::new(),
    }
}

/// Same as [`attr`] for numeric properties.
pub fn number_attr(name: &str, value: Option<u64>) -> String {
    value.map(|n| format!(" {name}=\"{n}\"")).unwrap_or_default()
}

/// Media source: an uploaded `url` wins over a parsed `src`.
pub fn media_source<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    el.property_str("url").or_else(|| el.property_str("src"))
}
