use formtree_xpath::{
    is_side_channel_key, join_key, normalize_xpath, side_channel_key, SIDE_CHANNEL_PREFIX,
};
use serde_json::{Map, Value};

use super::{CollectionIndex, Row};
use crate::collections::Collection;
use crate::constants::DATA_ID;

/// Flatten row trees into rows.
///
/// `xpath` is the row root the trees were generated from, as passed to
/// [`generate_row_trees`](super::generate_row_trees).
///
/// # Example
///
/// ```
/// use formtree::generate_rows_from_tree;
/// use serde_json::json;
///
/// let tree = json!({"name": "s", "legs": [{"px": 1, "xpath_px": "legs[3].px"}], "data-id": 0});
/// let rows = generate_rows_from_tree(&[tree], &[], None);
/// assert_eq!(serde_json::Value::Object(rows[0].clone()), json!({
///     "name": "s",
///     "legs.px": 1,
///     "xpath_legs.px": "legs[3].px",
///     "data-id": 0,
/// }));
/// ```
pub fn generate_rows_from_tree(
    trees: &[Value],
    collections: &[Collection],
    xpath: Option<&str>,
) -> Vec<Row> {
    let index = CollectionIndex::new(collections, xpath.map(normalize_xpath).unwrap_or_default());
    trees
        .iter()
        .map(|tree| {
            let mut row = Row::new();
            if let Value::Object(map) = tree {
                flatten_object(map, "", &index, &mut row);
            }
            row
        })
        .collect()
}

/// Merge the fields of `object` into `row` under `prefix`.
///
/// Nested objects and the (single) element of nested arrays of documents
/// flatten under their parent's dotted name. JSON-abbreviated fields and
/// arrays of primitives stay whole.
pub fn flatten_object(
    object: &Map<String, Value>,
    prefix: &str,
    index: &CollectionIndex<'_>,
    row: &mut Row,
) {
    for (key, value) in object {
        if prefix.is_empty() && key == DATA_ID {
            row.insert(key.clone(), value.clone());
            continue;
        }
        if is_side_channel_key(key) {
            let field = &key[SIDE_CHANNEL_PREFIX.len()..];
            row.insert(side_channel_key(&join_key(prefix, field)), value.clone());
            continue;
        }
        let dotted = join_key(prefix, key);
        if index
            .get_by_title(&dotted)
            .is_some_and(Collection::is_json_abbreviated)
        {
            row.insert(dotted, value.clone());
            continue;
        }
        match value {
            Value::Object(nested) => flatten_object(nested, &dotted, index, row),
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {
                if let Some(Value::Object(first)) = items.first() {
                    flatten_object(first, &dotted, index, row);
                }
            }
            other => {
                row.insert(dotted, other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object_collection(table_title: &str, abbreviated: Option<&str>) -> Collection {
        serde_json::from_value(json!({
            "key": "meta", "title": "Meta", "tableTitle": table_title,
            "xpath": table_title.replace('.', "[0]."), "sequenceNumber": 1, "type": "object",
            "required": false, "hide": false, "serverPopulate": false, "ormNoUpdate": false,
            "uiUpdateOnly": false, "noCommonKey": false, "abbreviated": abbreviated
        }))
        .unwrap()
    }

    #[test]
    fn test_abbreviated_object_kept_whole() {
        let meta = object_collection("foo.meta", Some("JSON"));
        let tree = json!({"meta": {"a": 1}, "other": {"b": 2}});
        let rows = generate_rows_from_tree(&[tree], &[meta], Some("foo"));
        assert_eq!(rows[0].get("meta"), Some(&json!({"a": 1})));
        assert_eq!(rows[0].get("other.b"), Some(&json!(2)));
        assert_eq!(rows[0].get("other"), None);
    }

    #[test]
    fn test_same_field_name_resolves_under_row_root() {
        let collections = [
            object_collection("foo.meta", Some("JSON")),
            object_collection("bar.meta", None),
        ];
        let tree = json!({"meta": {"a": 1}});

        let rows = generate_rows_from_tree(&[tree.clone()], &collections, Some("bar"));
        assert_eq!(rows[0].get("meta.a"), Some(&json!(1)));
        assert_eq!(rows[0].get("meta"), None);

        let rows = generate_rows_from_tree(&[tree], &collections, Some("foo"));
        assert_eq!(rows[0].get("meta"), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_nested_side_channels_follow_dotted_names() {
        let tree = json!({"o": {"x": 1, "xpath_x": "o.x"}, "xpath_o": "o"});
        let rows = generate_rows_from_tree(&[tree], &[], None);
        assert_eq!(rows[0].get("xpath_o.x"), Some(&json!("o.x")));
        assert_eq!(rows[0].get("xpath_o"), Some(&json!("o")));
    }
}
