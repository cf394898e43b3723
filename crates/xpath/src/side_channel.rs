//! `xpath_<field>` side-channels.
//!
//! Every field of an annotated document carries a sibling string property
//! holding the field's schema xpath. Array elements keep these records when
//! they are reordered, removed around, or appended, which is what lets a
//! live element be matched back to its stored position.

use serde_json::Value;

use crate::{join_index, join_key};

/// Prefix of every side-channel key.
pub const SIDE_CHANNEL_PREFIX: &str = "xpath_";

/// The side-channel key recording `field`'s xpath.
pub fn side_channel_key(field: &str) -> String {
    format!("{SIDE_CHANNEL_PREFIX}{field}")
}

/// Check if an object key is a side-channel record rather than data.
pub fn is_side_channel_key(key: &str) -> bool {
    key.starts_with(SIDE_CHANNEL_PREFIX)
}

/// Annotate every field under `value` with its xpath relative to `root`.
///
/// Existing side-channels are overwritten, so annotating twice is the same
/// as annotating once.
///
/// # Example
///
/// ```
/// use formtree_xpath::add_xpath;
/// use serde_json::json;
///
/// let mut doc = json!({"foo": [{"name": "a"}], "bar": null});
/// add_xpath(&mut doc, "");
/// assert_eq!(doc, json!({
///     "foo": [{"name": "a", "xpath_name": "foo[0].name"}],
///     "bar": null,
///     "xpath_foo": "foo",
///     "xpath_bar": "bar",
/// }));
/// ```
pub fn add_xpath(value: &mut Value, root: &str) {
    match value {
        Value::Object(map) => {
            let fields: Vec<String> = map
                .keys()
                .filter(|key| !is_side_channel_key(key))
                .cloned()
                .collect();
            let mut records = Vec::with_capacity(fields.len());
            for field in fields {
                let xpath = join_key(root, &field);
                if let Some(child) = map.get_mut(&field) {
                    add_xpath(child, &xpath);
                }
                records.push((side_channel_key(&field), Value::String(xpath)));
            }
            for (key, xpath) in records {
                map.insert(key, xpath);
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter_mut().enumerate() {
                add_xpath(item, &join_index(root, idx));
            }
        }
        _ => {}
    }
}

/// Strip every side-channel under `value`.
///
/// For any document without `xpath_*` keys of its own,
/// `clear_xpath(add_xpath(x))` gives back `x`.
pub fn clear_xpath(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !is_side_channel_key(key));
            for child in map.values_mut() {
                clear_xpath(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(clear_xpath),
        _ => {}
    }
}

/// The schema xpath an annotated array element was stored under.
///
/// Any field record works: `foo[3].name` and `foo[3].bar` both name the
/// element `foo[3]`. Elements with no record yield `None`.
///
/// ```
/// use formtree_xpath::element_xpath;
/// use serde_json::json;
///
/// let element = json!({"name": "a", "xpath_name": "foo[3].name"});
/// assert_eq!(element_xpath(&element).as_deref(), Some("foo[3]"));
/// assert_eq!(element_xpath(&json!({"name": "a"})), None);
/// ```
pub fn element_xpath(element: &Value) -> Option<String> {
    element
        .as_object()?
        .iter()
        .filter(|(key, _)| is_side_channel_key(key))
        .find_map(|(_, recorded)| recorded.as_str())
        .and_then(|recorded| recorded.rfind('.').map(|pos| recorded[..pos].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_xpath_nested_objects_and_arrays() {
        let mut doc = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        add_xpath(&mut doc, "");
        assert_eq!(doc["xpath_a"], json!("a"));
        assert_eq!(doc["a"]["xpath_b"], json!("a.b"));
        assert_eq!(doc["a"]["b"][1]["xpath_c"], json!("a.b[1].c"));
    }

    #[test]
    fn test_add_xpath_with_root_prefix() {
        let mut element = json!({"name": "x", "inner": {"v": 1}});
        add_xpath(&mut element, "foo[7]");
        assert_eq!(element["xpath_name"], json!("foo[7].name"));
        assert_eq!(element["inner"]["xpath_v"], json!("foo[7].inner.v"));
        assert_eq!(element_xpath(&element).as_deref(), Some("foo[7]"));
    }

    #[test]
    fn test_root_level_array() {
        let mut rows = json!([{"a": 1}, {"a": 2}]);
        add_xpath(&mut rows, "");
        assert_eq!(rows[1]["xpath_a"], json!("[1].a"));
        assert_eq!(element_xpath(&rows[1]).as_deref(), Some("[1]"));
    }

    #[test]
    fn test_add_xpath_is_idempotent() {
        let mut once = json!({"a": [{"b": null}]});
        add_xpath(&mut once, "");
        let mut twice = once.clone();
        add_xpath(&mut twice, "");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clear_xpath_roundtrip() {
        let original = json!({"a": [{"b": [1, 2]}, {"b": []}], "c": {"d": null}, "e": "x"});
        let mut doc = original.clone();
        add_xpath(&mut doc, "");
        assert_ne!(doc, original);
        clear_xpath(&mut doc);
        assert_eq!(doc, original);
    }
}
