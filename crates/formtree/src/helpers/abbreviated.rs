//! `abbreviated` declarations.
//!
//! Either the bare marker `JSON`, meaning the container is shown as one
//! opaque value, or a `~`-separated list of `Label:xpath` entries naming the
//! fields that make up a one-line summary of an element.

use indexmap::IndexMap;
use serde_json::Value;

use crate::constants::JSON_ABBREVIATION;

/// Parse the `Label:xpath` entries of an abbreviation.
///
/// The `JSON` marker and entries without a `:` produce nothing.
///
/// ```
/// use formtree::helpers::parse_abbreviated;
///
/// let fields = parse_abbreviated("Symbol:security.sec_id~Side:side~oops");
/// assert_eq!(fields.get("Symbol").map(String::as_str), Some("security.sec_id"));
/// assert_eq!(fields.get("Side").map(String::as_str), Some("side"));
/// assert_eq!(fields.len(), 2);
/// assert!(parse_abbreviated("JSON").is_empty());
/// ```
pub fn parse_abbreviated(declaration: &str) -> IndexMap<String, String> {
    let mut fields = IndexMap::new();
    if declaration.trim() == JSON_ABBREVIATION {
        return fields;
    }
    for entry in declaration.split('~').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.split_once(':') {
            Some((label, xpath)) if !label.trim().is_empty() && !xpath.trim().is_empty() => {
                fields.insert(label.trim().to_string(), xpath.trim().to_string());
            }
            _ => tracing::debug!(entry, "dropping malformed abbreviated entry"),
        }
    }
    fields
}

/// Summary key of one element: the abbreviated fields' values joined by `-`.
///
/// Missing or `null` values contribute nothing; strings are used unquoted.
pub fn abbreviated_key(element: &Value, fields: &IndexMap<String, String>) -> String {
    fields
        .values()
        .filter_map(|xpath| formtree_xpath::get_by_xpath(element, xpath))
        .filter(|value| !value.is_null())
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_abbreviated_key() {
        let fields = parse_abbreviated("Symbol:security.sec_id~Qty:qty~Note:note");
        let element = json!({"security": {"sec_id": "AAPL"}, "qty": 100, "note": null});
        assert_eq!(abbreviated_key(&element, &fields), "AAPL-100");
    }

    #[test]
    fn test_missing_fields_contribute_nothing() {
        let fields = parse_abbreviated("A:a~B:b");
        assert_eq!(abbreviated_key(&json!({}), &fields), "");
    }
}
