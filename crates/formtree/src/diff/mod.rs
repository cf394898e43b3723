//! Stored-vs-live comparison.
//!
//! [`compare_nodes`] classifies a single position for the tree builder;
//! [`compare_objects`] produces the minimal update document sent when the
//! user saves.

use formtree_util::deep_equal_by_key;
use formtree_xpath::{clear_xpath, is_side_channel_key};
use serde_json::{Map, Value};

use crate::constants::DB_ID;
use crate::tree::ModificationState;

fn data_equal(a: &Value, b: &Value) -> bool {
    deep_equal_by_key(a, b, &|key: &str| !is_side_channel_key(key))
}

fn without_side_channels(value: &Value) -> Value {
    let mut value = value.clone();
    clear_xpath(&mut value);
    value
}

/// Classify one position given its stored and live values.
///
/// `None` means the position does not exist in that snapshot. An explicit
/// `null` exists. Side-channels never count as a difference.
///
/// ```
/// use formtree::{compare_nodes, ModificationState};
/// use serde_json::json;
///
/// assert_eq!(compare_nodes(Some(&json!(1)), Some(&json!(1))), ModificationState::Unmodified);
/// assert_eq!(compare_nodes(Some(&json!(1)), Some(&json!(2))), ModificationState::Modified);
/// assert_eq!(compare_nodes(None, Some(&json!(2))), ModificationState::Added);
/// assert_eq!(compare_nodes(Some(&json!(1)), None), ModificationState::Removed);
/// ```
pub fn compare_nodes(stored: Option<&Value>, live: Option<&Value>) -> ModificationState {
    match (stored, live) {
        (None, None) => ModificationState::Unmodified,
        (None, Some(_)) => ModificationState::Added,
        (Some(_), None) => ModificationState::Removed,
        (Some(stored), Some(live)) if data_equal(stored, live) => ModificationState::Unmodified,
        (Some(_), Some(_)) => ModificationState::Modified,
    }
}

/// The update that turns `original` into `current`.
///
/// - changed or new keys carry their current value
/// - keys missing from `current` are `null`
/// - nested objects appear only when something under them changed
/// - arrays of documents are matched by `_id`: new documents appear whole,
///   deleted ones as an `{"_id": ..}` stub, kept ones as their own diff
/// - arrays without identifiers are replaced whole when they differ
///
/// Every non-empty object diff carries the `_id` of the document it
/// belongs to. Side-channels are ignored and never emitted.
///
/// # Example
///
/// ```
/// use formtree::compare_objects;
/// use serde_json::json;
///
/// let original = json!({"_id": 1, "name": "a", "legs": [{"_id": 10, "px": 1}, {"_id": 11, "px": 2}]});
/// let current = json!({"_id": 1, "name": "a", "legs": [{"_id": 10, "px": 5}, {"px": 3}]});
/// let diff = compare_objects(original.as_object().unwrap(), current.as_object().unwrap());
/// assert_eq!(serde_json::Value::Object(diff), json!({
///     "_id": 1,
///     "legs": [{"_id": 10, "px": 5}, {"px": 3}, {"_id": 11}]
/// }));
/// ```
pub fn compare_objects(
    original: &Map<String, Value>,
    current: &Map<String, Value>,
) -> Map<String, Value> {
    let mut diff = Map::new();
    for (key, value) in current.iter().filter(|(key, _)| !is_side_channel_key(key)) {
        if key == DB_ID {
            continue;
        }
        let Some(before) = original.get(key) else {
            diff.insert(key.clone(), without_side_channels(value));
            continue;
        };
        match (before, value) {
            (Value::Object(before), Value::Object(after)) => {
                let nested = compare_objects(before, after);
                if !nested.is_empty() {
                    diff.insert(key.clone(), Value::Object(nested));
                }
            }
            (Value::Array(before), Value::Array(after)) => {
                if let Some(nested) = compare_arrays(before, after) {
                    diff.insert(key.clone(), nested);
                }
            }
            (before, after) if !data_equal(before, after) => {
                diff.insert(key.clone(), without_side_channels(after));
            }
            _ => {}
        }
    }
    for key in original.keys() {
        if key != DB_ID && !is_side_channel_key(key) && !current.contains_key(key) {
            diff.insert(key.clone(), Value::Null);
        }
    }
    if !diff.is_empty() {
        if let Some(id) = current.get(DB_ID).or_else(|| original.get(DB_ID)) {
            diff.insert(DB_ID.to_string(), id.clone());
        }
    }
    diff
}

fn document_id(value: &Value) -> Option<&Value> {
    value.as_object()?.get(DB_ID)
}

fn compare_arrays(original: &[Value], current: &[Value]) -> Option<Value> {
    let keyed = original.iter().chain(current).any(|item| document_id(item).is_some());
    if !keyed {
        return (!data_equal(&Value::Array(original.to_vec()), &Value::Array(current.to_vec())))
            .then(|| without_side_channels(&Value::Array(current.to_vec())));
    }
    let mut changes = Vec::new();
    for item in current {
        let matched = document_id(item)
            .and_then(|id| original.iter().find(|before| document_id(before) == Some(id)));
        match (matched.and_then(Value::as_object), item.as_object()) {
            (Some(before), Some(after)) => {
                let nested = compare_objects(before, after);
                if !nested.is_empty() {
                    changes.push(Value::Object(nested));
                }
            }
            _ => changes.push(without_side_channels(item)),
        }
    }
    for before in original {
        if let Some(id) = document_id(before) {
            if !current.iter().any(|item| document_id(item) == Some(id)) {
                let mut stub = Map::new();
                stub.insert(DB_ID.to_string(), id.clone());
                changes.push(Value::Object(stub));
            }
        }
    }
    (!changes.is_empty()).then_some(Value::Array(changes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diff(original: Value, current: Value) -> Value {
        Value::Object(compare_objects(
            original.as_object().unwrap(),
            current.as_object().unwrap(),
        ))
    }

    #[test]
    fn test_side_channels_ignored() {
        assert_eq!(
            compare_nodes(Some(&json!({"a": 1})), Some(&json!({"a": 1, "xpath_a": "x.a"}))),
            ModificationState::Unmodified
        );
        assert_eq!(diff(json!({"a": 1}), json!({"a": 1, "xpath_a": "a"})), json!({}));
    }

    #[test]
    fn test_null_is_present() {
        assert_eq!(compare_nodes(Some(&Value::Null), Some(&json!(3))), ModificationState::Modified);
        assert_eq!(compare_nodes(None, Some(&Value::Null)), ModificationState::Added);
    }

    #[test]
    fn test_removed_key_becomes_null() {
        assert_eq!(
            diff(json!({"_id": 7, "a": 1, "b": 2}), json!({"_id": 7, "a": 1})),
            json!({"_id": 7, "b": null})
        );
    }

    #[test]
    fn test_nested_object_only_when_changed() {
        assert_eq!(
            diff(json!({"o": {"x": 1, "y": 2}}), json!({"o": {"x": 1, "y": 3}})),
            json!({"o": {"y": 3}})
        );
        assert_eq!(diff(json!({"o": {"x": 1}}), json!({"o": {"x": 1}})), json!({}));
    }

    #[test]
    fn test_unkeyed_array_replaced_whole() {
        assert_eq!(
            diff(json!({"tags": ["a", "b"]}), json!({"tags": ["a", "c"], "xpath_tags": "tags"})),
            json!({"tags": ["a", "c"]})
        );
        assert_eq!(diff(json!({"tags": ["a"]}), json!({"tags": ["a"]})), json!({}));
    }

    #[test]
    fn test_keyed_array_deleted_and_added_documents() {
        let original = json!({"legs": [{"_id": 1, "px": 1}, {"_id": 2, "px": 2}]});
        let current = json!({"legs": [
            {"_id": 2, "px": 2, "xpath_px": "legs[1].px"},
            {"px": 9, "xpath_px": "legs[2].px"}
        ]});
        assert_eq!(diff(original, current), json!({"legs": [{"px": 9}, {"_id": 1}]}));
    }

    #[test]
    fn test_new_object_value_stripped_of_side_channels() {
        assert_eq!(
            diff(json!({"o": null}), json!({"o": {"x": 1, "xpath_x": "o.x"}})),
            json!({"o": {"x": 1}})
        );
    }
}
