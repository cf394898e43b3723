//! Dotted/bracketed xpath utilities.
//!
//! An xpath addresses a value inside a JSON document the way a form field
//! names it: object keys joined with `.`, array positions written `[n]`.
//!
//! Two address spaces share this syntax. A *schema xpath* is computed
//! against the originally stored document and never changes while the user
//! edits; a *data xpath* points into the live, possibly reordered, copy.
//! [`add_xpath`] records every field's schema xpath next to it as an
//! `xpath_<field>` side-channel, and [`get_data_xpath`] uses those records to
//! translate a schema xpath into the live document.
//!
//! # Example
//!
//! ```
//! use formtree_xpath::{add_xpath, format_xpath, get_by_xpath, get_data_xpath, parse_xpath};
//! use serde_json::json;
//!
//! let path = parse_xpath("foo[1].name").unwrap();
//! assert_eq!(format_xpath(&path), "foo[1].name");
//!
//! let mut live = json!({"foo": [{"name": "a"}, {"name": "b"}]});
//! add_xpath(&mut live, "");
//! live["foo"].as_array_mut().unwrap().remove(0);
//!
//! // "foo[1]" moved to position 0 in the live copy.
//! assert_eq!(get_data_xpath(&live, "foo[1].name").as_deref(), Some("foo[0].name"));
//! assert_eq!(get_by_xpath(&live, "foo[0].name"), Some(&json!("b")));
//! assert_eq!(get_data_xpath(&live, "foo[0].name"), None);
//! ```

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep, PLACEHOLDER_INDEX};

pub mod side_channel;
pub use side_channel::{
    add_xpath, clear_xpath, element_xpath, is_side_channel_key, side_channel_key,
    SIDE_CHANNEL_PREFIX,
};

pub mod translate;
pub use translate::get_data_xpath;

fn segment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^\[\]]*)((?:\[-?\d+\])*)$").unwrap())
}

fn index_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(-?\d+)\]").unwrap())
}

/// Parse an xpath string into steps.
///
/// The empty string is the root. A leading `[n]` addresses an element of a
/// root-level array.
///
/// # Example
///
/// ```
/// use formtree_xpath::{parse_xpath, PathStep};
///
/// assert_eq!(parse_xpath("").unwrap(), vec![]);
/// assert_eq!(
///     parse_xpath("a.b[2]").unwrap(),
///     vec![PathStep::Key("a".into()), PathStep::Key("b".into()), PathStep::Index(2)]
/// );
/// assert_eq!(parse_xpath("[0].x").unwrap()[0], PathStep::Index(0));
/// assert_eq!(parse_xpath("a[-1]").unwrap()[1], PathStep::Placeholder);
/// assert!(parse_xpath("a..b").is_err());
/// assert!(parse_xpath("a[-2]").is_err());
/// ```
pub fn parse_xpath(xpath: &str) -> Result<Path, XPathError> {
    let mut path = Vec::new();
    if xpath.is_empty() {
        return Ok(path);
    }
    for (position, segment) in xpath.split('.').enumerate() {
        let caps = segment_regex()
            .captures(segment)
            .ok_or_else(|| XPathError::InvalidXPath(xpath.to_string()))?;
        let name = caps.get(1).map_or("", |m| m.as_str());
        let indices = caps.get(2).map_or("", |m| m.as_str());
        if name.is_empty() && (position > 0 || indices.is_empty()) {
            return Err(XPathError::InvalidXPath(xpath.to_string()));
        }
        if !name.is_empty() {
            path.push(PathStep::Key(name.to_string()));
        }
        for idx in index_regex().captures_iter(indices) {
            let raw: i64 = idx[1]
                .parse()
                .map_err(|_| XPathError::InvalidIndex(xpath.to_string()))?;
            let step = match raw {
                PLACEHOLDER_INDEX => PathStep::Placeholder,
                n if n >= 0 => PathStep::Index(n as usize),
                _ => return Err(XPathError::InvalidIndex(xpath.to_string())),
            };
            path.push(step);
        }
    }
    Ok(path)
}

/// Format steps back into an xpath string.
///
/// # Example
///
/// ```
/// use formtree_xpath::{format_xpath, PathStep};
///
/// assert_eq!(format_xpath(&[]), "");
/// assert_eq!(format_xpath(&[PathStep::Index(0), PathStep::Key("x".into())]), "[0].x");
/// ```
pub fn format_xpath(path: &[PathStep]) -> String {
    let mut out = String::new();
    for step in path {
        if let PathStep::Key(_) = step {
            if !out.is_empty() {
                out.push('.');
            }
        }
        out.push_str(&step.to_string());
    }
    out
}

/// Append an object key to an xpath.
pub fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Append an array index to an xpath.
pub fn join_index(prefix: &str, index: usize) -> String {
    format!("{prefix}[{index}]")
}

/// Append the `[-1]` sentinel to an xpath.
pub fn join_placeholder(prefix: &str) -> String {
    format!("{prefix}[{PLACEHOLDER_INDEX}]")
}

/// Get a value from a JSON document by path.
///
/// Returns `None` if any step is missing. A placeholder step never resolves.
pub fn get<'a>(val: &'a Value, path: &[PathStep]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match (current, step) {
            (Value::Object(map), PathStep::Key(key)) => map.get(key)?,
            (Value::Array(arr), PathStep::Index(idx)) => arr.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a mutable reference to a value in a JSON document by path.
pub fn get_mut<'a>(val: &'a mut Value, path: &[PathStep]) -> Option<&'a mut Value> {
    let mut current = val;
    for step in path {
        current = match (current, step) {
            (Value::Object(map), PathStep::Key(key)) => map.get_mut(key)?,
            (Value::Array(arr), PathStep::Index(idx)) => arr.get_mut(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a value by xpath string. Unparseable xpaths resolve to `None`.
///
/// # Example
///
/// ```
/// use formtree_xpath::get_by_xpath;
/// use serde_json::json;
///
/// let doc = json!({"foo": [{"bar": 1}]});
/// assert_eq!(get_by_xpath(&doc, "foo[0].bar"), Some(&json!(1)));
/// assert_eq!(get_by_xpath(&doc, ""), Some(&doc));
/// assert_eq!(get_by_xpath(&doc, "foo[1].bar"), None);
/// ```
pub fn get_by_xpath<'a>(val: &'a Value, xpath: &str) -> Option<&'a Value> {
    let path = parse_xpath(xpath).ok()?;
    get(val, &path)
}

/// Mutable variant of [`get_by_xpath`].
pub fn get_by_xpath_mut<'a>(val: &'a mut Value, xpath: &str) -> Option<&'a mut Value> {
    let path = parse_xpath(xpath).ok()?;
    get_mut(val, &path)
}

fn empty_container(as_array: bool) -> Value {
    if as_array {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn mismatch(container: &Value, path: &[PathStep]) -> XPathError {
    let at = format_xpath(path);
    match container {
        Value::Object(_) => XPathError::NotAnArray(at),
        Value::Array(_) => XPathError::NotAnObject(at),
        _ => XPathError::NotFound(at),
    }
}

fn child_or_insert<'a>(
    current: &'a mut Value,
    step: &PathStep,
    next_is_index: bool,
    path: &[PathStep],
) -> Result<&'a mut Value, XPathError> {
    if current.is_null() {
        *current = empty_container(step.is_index());
    }
    match (current, step) {
        (Value::Object(map), PathStep::Key(key)) => {
            let slot = map
                .entry(key.clone())
                .or_insert_with(|| empty_container(next_is_index));
            if slot.is_null() {
                *slot = empty_container(next_is_index);
            }
            Ok(slot)
        }
        (Value::Array(arr), PathStep::Index(idx)) => {
            if *idx == arr.len() {
                arr.push(empty_container(next_is_index));
            }
            arr.get_mut(*idx)
                .ok_or_else(|| XPathError::InvalidIndex(format_xpath(path)))
        }
        (other, _) => Err(mismatch(other, path)),
    }
}

/// Set a value by path, creating missing intermediate containers.
///
/// An index equal to the array length appends. Intermediate `null`s are
/// replaced by the container the next step needs.
///
/// # Errors
///
/// - `XPathError::InvalidIndex` for a placeholder step or an index past the end
/// - `XPathError::NotAnArray` / `NotAnObject` when a step does not fit its container
pub fn set(val: &mut Value, path: &[PathStep], new_value: Value) -> Result<(), XPathError> {
    let Some((last, parents)) = path.split_last() else {
        *val = new_value;
        return Ok(());
    };
    let mut current = val;
    for (i, step) in parents.iter().enumerate() {
        current = child_or_insert(current, step, path[i + 1].is_index(), path)?;
    }
    if current.is_null() {
        *current = empty_container(last.is_index());
    }
    match (current, last) {
        (Value::Object(map), PathStep::Key(key)) => {
            map.insert(key.clone(), new_value);
            Ok(())
        }
        (Value::Array(arr), PathStep::Index(idx)) => {
            if *idx < arr.len() {
                arr[*idx] = new_value;
                Ok(())
            } else if *idx == arr.len() {
                arr.push(new_value);
                Ok(())
            } else {
                Err(XPathError::InvalidIndex(format_xpath(path)))
            }
        }
        (Value::Array(_), PathStep::Placeholder) => {
            Err(XPathError::InvalidIndex(format_xpath(path)))
        }
        (other, _) => Err(mismatch(other, path)),
    }
}

/// Set a value by xpath string.
pub fn set_by_xpath(val: &mut Value, xpath: &str, new_value: Value) -> Result<(), XPathError> {
    let path = parse_xpath(xpath)?;
    set(val, &path, new_value)
}

/// Remove the value at a path and return it.
///
/// Object keys are removed in place without disturbing the order of the
/// remaining keys; array elements shift down.
pub fn remove(val: &mut Value, path: &[PathStep]) -> Result<Value, XPathError> {
    let (last, parents) = path.split_last().ok_or(XPathError::NoParent)?;
    let parent = get_mut(val, parents).ok_or_else(|| XPathError::NotFound(format_xpath(path)))?;
    match (parent, last) {
        (Value::Object(map), PathStep::Key(key)) => map
            .shift_remove(key)
            .ok_or_else(|| XPathError::NotFound(format_xpath(path))),
        (Value::Array(arr), PathStep::Index(idx)) if *idx < arr.len() => Ok(arr.remove(*idx)),
        (Value::Array(_), _) => Err(XPathError::InvalidIndex(format_xpath(path))),
        (other, _) => Err(mismatch(other, path)),
    }
}

/// Remove the value at an xpath string and return it.
pub fn remove_by_xpath(val: &mut Value, xpath: &str) -> Result<Value, XPathError> {
    let path = parse_xpath(xpath)?;
    remove(val, &path)
}

/// Replace every array index with `[0]`.
///
/// Collections describe array elements with a `[0]` placeholder, so this maps
/// any concrete xpath onto the collection that describes it.
///
/// ```
/// use formtree_xpath::normalize_xpath;
///
/// assert_eq!(normalize_xpath("foo[3].bar[12].x"), "foo[0].bar[0].x");
/// assert_eq!(normalize_xpath("foo[-1]"), "foo[0]");
/// ```
pub fn normalize_xpath(xpath: &str) -> String {
    index_regex().replace_all(xpath, "[0]").into_owned()
}

/// The trailing array index of an xpath, if it ends in one.
pub fn last_index(xpath: &str) -> Option<usize> {
    parse_xpath(xpath).ok()?.last()?.as_index()
}

/// Check if `xpath` is `prefix` or lies underneath it.
///
/// ```
/// use formtree_xpath::is_prefix;
///
/// assert!(is_prefix("foo", "foo"));
/// assert!(is_prefix("foo", "foo.bar"));
/// assert!(is_prefix("foo", "foo[1]"));
/// assert!(!is_prefix("foo", "foobar"));
/// assert!(is_prefix("", "anything"));
/// ```
pub fn is_prefix(prefix: &str, xpath: &str) -> bool {
    if prefix.is_empty() || xpath == prefix {
        return true;
    }
    xpath.starts_with(prefix)
        && matches!(xpath.as_bytes().get(prefix.len()), Some(b'.') | Some(b'['))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum XPathError {
    #[error("INVALID_XPATH: {0}")]
    InvalidXPath(String),
    #[error("INVALID_INDEX: {0}")]
    InvalidIndex(String),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("NOT_AN_ARRAY: {0}")]
    NotAnArray(String),
    #[error("NOT_AN_OBJECT: {0}")]
    NotAnObject(String),
    #[error("NO_PARENT")]
    NoParent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested_indices() {
        let path = parse_xpath("grid[1][2].cell").unwrap();
        assert_eq!(
            path,
            vec![
                PathStep::Key("grid".into()),
                PathStep::Index(1),
                PathStep::Index(2),
                PathStep::Key("cell".into()),
            ]
        );
        assert_eq!(format_xpath(&path), "grid[1][2].cell");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_xpath(".a").is_err());
        assert!(parse_xpath("a.").is_err());
        assert!(parse_xpath("a[x]").is_err());
        assert!(parse_xpath("a]").is_err());
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut doc = json!({});
        set_by_xpath(&mut doc, "a.b[0].c", json!(1)).unwrap();
        assert_eq!(doc, json!({"a": {"b": [{"c": 1}]}}));
    }

    #[test]
    fn test_set_replaces_null_parent() {
        let mut doc = json!({"a": null});
        set_by_xpath(&mut doc, "a.x", json!(true)).unwrap();
        assert_eq!(doc, json!({"a": {"x": true}}));
    }

    #[test]
    fn test_set_rejects_gap_and_placeholder() {
        let mut doc = json!({"a": [1]});
        assert!(matches!(
            set_by_xpath(&mut doc, "a[3]", json!(2)),
            Err(XPathError::InvalidIndex(_))
        ));
        assert!(matches!(
            set_by_xpath(&mut doc, "a[-1]", json!(2)),
            Err(XPathError::InvalidIndex(_))
        ));
        assert!(matches!(
            set_by_xpath(&mut doc, "a.b", json!(2)),
            Err(XPathError::NotAnObject(_))
        ));
    }

    #[test]
    fn test_remove_keeps_key_order() {
        let mut doc = json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(remove_by_xpath(&mut doc, "a").unwrap(), json!(1));
        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_remove_array_element() {
        let mut doc = json!({"a": [1, 2, 3]});
        assert_eq!(remove_by_xpath(&mut doc, "a[1]").unwrap(), json!(2));
        assert_eq!(doc, json!({"a": [1, 3]}));
        assert!(remove_by_xpath(&mut doc, "a[5]").is_err());
        assert_eq!(remove_by_xpath(&mut doc, ""), Err(XPathError::NoParent));
    }

    #[test]
    fn test_last_index() {
        assert_eq!(last_index("a.b[4]"), Some(4));
        assert_eq!(last_index("a.b"), None);
        assert_eq!(last_index("a[-1]"), None);
    }
}
