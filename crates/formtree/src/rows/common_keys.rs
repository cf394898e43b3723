use formtree_util::{deep_equal, is_blank};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Row;
use crate::collections::Collection;

/// A column hoisted out of the table because every row agrees on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonKeyCollection {
    #[serde(flatten)]
    pub collection: Collection,
    /// The shared value; `None` when no row sets the column.
    pub value: Option<Value>,
}

/// The value of `collection`'s column in `row`.
///
/// Rows are keyed relative to their root, so a model-rooted table title
/// such as `foo.name` also matches a row key `name`.
fn cell<'a>(row: &'a Row, collection: &Collection) -> Option<&'a Value> {
    let title = collection.table_title.as_str();
    row.get(title).or_else(|| {
        title
            .match_indices('.')
            .find_map(|(pos, _)| row.get(&title[pos + 1..]))
    })
}

fn is_candidate(collection: &Collection, hide: bool) -> bool {
    !(hide && collection.hide)
        && !collection.no_common_key
        && (!collection.is_container() || collection.is_json_abbreviated())
}

/// Columns whose value is the same in every row.
///
/// Blank cells (missing, `null`, `""`) agree with anything, so a column no
/// row sets is common too, with no value. An empty row set has no common
/// keys. Columns flagged `no_common_key`, hidden columns when `hide` is set,
/// and containers that are not JSON-abbreviated are never hoisted.
///
/// # Example
///
/// ```
/// use formtree::{get_common_key_collections, Collection};
/// use serde_json::json;
///
/// fn column(name: &str) -> Collection {
///     serde_json::from_value(json!({
///         "key": name, "title": name, "tableTitle": name, "xpath": name, "sequenceNumber": 1,
///         "type": "string", "required": false, "hide": false, "serverPopulate": false,
///         "ormNoUpdate": false, "uiUpdateOnly": false, "noCommonKey": false
///     })).unwrap()
/// }
///
/// let rows: Vec<_> = [json!({"status": "OK", "qty": 5}), json!({"status": "OK", "qty": 7})]
///     .into_iter()
///     .map(|row| row.as_object().unwrap().clone())
///     .collect();
/// let common = get_common_key_collections(&rows, &[column("status"), column("qty")], false);
/// assert_eq!(common.len(), 1);
/// assert_eq!(common[0].value, Some(json!("OK")));
/// ```
pub fn get_common_key_collections(
    rows: &[Row],
    collections: &[Collection],
    hide: bool,
) -> Vec<CommonKeyCollection> {
    if rows.is_empty() {
        return Vec::new();
    }
    let mut common = Vec::new();
    'columns: for collection in collections.iter().filter(|c| is_candidate(c, hide)) {
        let mut representative: Option<&Value> = None;
        for row in rows {
            let value = cell(row, collection);
            if is_blank(value) {
                continue;
            }
            match (representative, value) {
                (None, Some(value)) => representative = Some(value),
                (Some(first), Some(value)) if !deep_equal(first, value) => continue 'columns,
                _ => {}
            }
        }
        common.push(CommonKeyCollection {
            collection: collection.clone(),
            value: representative.cloned(),
        });
    }
    tracing::debug!(rows = rows.len(), common = common.len(), "computed common keys");
    common
}

/// Columns left in the table body once common keys are hoisted.
///
/// Containers only appear when JSON-abbreviated; hidden columns are dropped
/// when `hide` is set.
pub fn get_table_columns(
    collections: &[Collection],
    common: &[CommonKeyCollection],
    hide: bool,
) -> Vec<Collection> {
    collections
        .iter()
        .filter(|c| !(hide && c.hide))
        .filter(|c| !c.is_container() || c.is_json_abbreviated())
        .filter(|c| !common.iter().any(|k| k.collection.table_title == c.table_title))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::CollectionIndex;
    use serde_json::json;

    fn column(name: &str, extra: Value) -> Collection {
        let mut base = json!({
            "key": name, "title": name, "tableTitle": name, "xpath": name, "sequenceNumber": 1,
            "type": "string", "required": false, "hide": false, "serverPopulate": false,
            "ormNoUpdate": false, "uiUpdateOnly": false, "noCommonKey": false
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values.into_iter().map(|v| v.as_object().unwrap().clone()).collect()
    }

    #[test]
    fn test_blank_cells_agree() {
        let rows = rows(vec![json!({"a": null}), json!({"a": "x"}), json!({"a": ""}), json!({})]);
        let common = get_common_key_collections(&rows, &[column("a", json!({}))], false);
        assert_eq!(common[0].value, Some(json!("x")));
    }

    #[test]
    fn test_never_set_is_common_without_value() {
        let rows = rows(vec![json!({}), json!({"a": null})]);
        let common = get_common_key_collections(&rows, &[column("a", json!({}))], false);
        assert_eq!(common.len(), 1);
        assert_eq!(common[0].value, None);
    }

    #[test]
    fn test_excluded_columns() {
        let rows = rows(vec![json!({"a": 1, "b": 1, "c": 1, "o.x": 1})]);
        let columns = [
            column("a", json!({"noCommonKey": true})),
            column("b", json!({"hide": true})),
            column("c", json!({})),
            column("o", json!({"type": "object"})),
        ];
        let common = get_common_key_collections(&rows, &columns, true);
        let keys: Vec<_> = common.iter().map(|c| c.collection.key.as_str()).collect();
        assert_eq!(keys, vec!["c"]);

        let table = get_table_columns(&columns, &common, true);
        let keys: Vec<_> = table.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["a"]);
    }

    #[test]
    fn test_empty_rows_have_no_common_keys() {
        assert!(get_common_key_collections(&[], &[column("a", json!({}))], false).is_empty());
    }

    #[test]
    fn test_model_rooted_title_matches_relative_row_key() {
        let rows = rows(vec![json!({"name": "a"}), json!({"name": "a"})]);
        let columns = [column("foo.name", json!({}))];
        let common = get_common_key_collections(&rows, &columns, false);
        assert_eq!(common[0].value, Some(json!("a")));
        let index = CollectionIndex::new(&columns, "foo[0]".to_string());
        assert!(index.get_by_title("name").is_some());
    }
}
