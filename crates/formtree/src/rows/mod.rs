//! Tabular projection of a document.
//!
//! [`generate_row_trees`] snapshots the repeated structure at an xpath into
//! one tree per row, [`generate_rows_from_tree`] flattens each tree into a
//! dotted-key row, and [`get_common_key_collections`] finds the columns that
//! hold the same value in every row.
//!
//! Collections passed in are expected to describe the row root: either
//! built from the repeated element's schema, or from the model when rows
//! are rooted at the model. Lookups tolerate the model-rooted form for
//! array targets too.

mod common_keys;
mod flatten;

use std::collections::HashMap;

use formtree_xpath::{
    element_xpath, get_by_xpath, is_side_channel_key, join_index, join_key, normalize_xpath,
};
use serde_json::{Map, Value};

use crate::collections::Collection;
use crate::constants::{DATA_ID, DB_ID};

pub use common_keys::{get_common_key_collections, get_table_columns, CommonKeyCollection};
pub use flatten::{flatten_object, generate_rows_from_tree};

/// A flat row: dotted field path to value, plus `data-id` and the
/// `xpath_<dotted path>` side-channels of its cells.
pub type Row = Map<String, Value>;

/// One snapshot tree per row of the structure at `xpath` (the document
/// root when `None`).
///
/// - an array yields one tree per element, tagged with the element's `_id`
///   or, lacking one, its index; elements without `xpath_*` side-channels
///   are not addressable yet and are skipped
/// - an object yields one tree per peel pass: each pass copies the first
///   element of every nested array of documents, then splices one element
///   out of the innermost array that still has more, so the next pass sees
///   the next element; passes are numbered from 0
///
/// In both cases JSON-abbreviated fields are copied as opaque values and
/// empty arrays are left out. `data` itself is never modified.
///
/// # Example
///
/// ```
/// use formtree::generate_row_trees;
/// use serde_json::json;
///
/// let doc = json!({"name": "s", "legs": [{"px": 1}, {"px": 2}]});
/// let trees = generate_row_trees(&doc, &[], None);
/// assert_eq!(trees, vec![
///     json!({"name": "s", "legs": [{"px": 1}], "data-id": 0}),
///     json!({"name": "s", "legs": [{"px": 2}], "data-id": 1}),
/// ]);
/// ```
pub fn generate_row_trees(
    data: &Value,
    collections: &[Collection],
    xpath: Option<&str>,
) -> Vec<Value> {
    let target = match xpath {
        Some(xpath) => get_by_xpath(data, xpath),
        None => Some(data),
    };
    let base = xpath.map(normalize_xpath).unwrap_or_default();
    let mut trees = Vec::new();
    match target {
        Some(Value::Array(items)) => {
            let mut copier = TreeCopier::new(collections, join_index(&base, 0), false);
            for (idx, item) in items.iter().enumerate() {
                if element_xpath(item).is_none() {
                    tracing::trace!(index = idx, "skipping unannotated element");
                    continue;
                }
                let mut item = item.clone();
                let mut tree = copier.copy(&mut item, "");
                let id = item.get(DB_ID).cloned().unwrap_or_else(|| Value::from(idx));
                tag(&mut tree, id);
                trees.push(tree);
            }
        }
        Some(object @ Value::Object(_)) => {
            let mut copier = TreeCopier::new(collections, base, true);
            let mut working = object.clone();
            for pass in 0usize.. {
                copier.peeled = false;
                let mut tree = copier.copy(&mut working, "");
                tag(&mut tree, Value::from(pass));
                trees.push(tree);
                if !copier.peeled {
                    break;
                }
            }
        }
        _ => tracing::debug!(xpath = ?xpath, "no rows: target is not an object or array"),
    }
    tracing::debug!(rows = trees.len(), "generated row trees");
    trees
}

fn tag(tree: &mut Value, id: Value) {
    if let Value::Object(map) = tree {
        map.insert(DATA_ID.to_string(), id);
    }
}

/// Collections of one table, looked up relative to the row root.
///
/// A lookup first tries the path as given, for collections built from the
/// row element's schema, then the path under the row root, for collections
/// built from the model.
pub struct CollectionIndex<'a> {
    by_xpath: HashMap<&'a str, &'a Collection>,
    by_title: HashMap<&'a str, &'a Collection>,
    base: String,
    base_title: String,
}

impl<'a> CollectionIndex<'a> {
    /// `base` is the normalized schema xpath of the row root.
    pub fn new(collections: &'a [Collection], base: String) -> Self {
        Self {
            by_xpath: collections.iter().map(|c| (c.xpath.as_str(), c)).collect(),
            by_title: collections
                .iter()
                .map(|c| (c.table_title.as_str(), c))
                .collect(),
            base_title: base.replace("[0]", ""),
            base,
        }
    }

    /// By schema xpath relative to the row root, e.g. `legs[0].px`.
    pub fn get(&self, relative: &str) -> Option<&'a Collection> {
        self.by_xpath
            .get(relative)
            .or_else(|| self.by_xpath.get(join_key(&self.base, relative).as_str()))
            .copied()
    }

    /// By dotted table title relative to the row root, e.g. `legs.px`.
    pub fn get_by_title(&self, dotted: &str) -> Option<&'a Collection> {
        self.by_title
            .get(dotted)
            .or_else(|| self.by_title.get(join_key(&self.base_title, dotted).as_str()))
            .copied()
    }

    fn is_json_abbreviated(&self, relative: &str) -> bool {
        self.get(relative)
            .is_some_and(Collection::is_json_abbreviated)
    }
}

struct TreeCopier<'a> {
    index: CollectionIndex<'a>,
    peel: bool,
    peeled: bool,
}

impl<'a> TreeCopier<'a> {
    fn new(collections: &'a [Collection], base: String, peel: bool) -> Self {
        Self {
            index: CollectionIndex::new(collections, base),
            peel,
            peeled: false,
        }
    }

    /// Copy one row's worth of `source`, peeling at most one array element
    /// per call when peeling is on.
    fn copy(&mut self, source: &mut Value, path: &str) -> Value {
        let Value::Object(map) = source else {
            return source.clone();
        };
        let mut out = Map::new();
        for (key, value) in map.iter_mut() {
            let child_path = join_key(path, key);
            if is_side_channel_key(key) || self.index.is_json_abbreviated(&child_path) {
                out.insert(key.clone(), value.clone());
                continue;
            }
            if value.is_object() {
                let child = self.copy(value, &child_path);
                out.insert(key.clone(), child);
                continue;
            }
            let Value::Array(items) = value else {
                out.insert(key.clone(), value.clone());
                continue;
            };
            if items.is_empty() {
                continue;
            }
            if !items[0].is_object() {
                out.insert(key.clone(), Value::Array(items.clone()));
                continue;
            }
            let first = self.copy(&mut items[0], &join_index(&child_path, 0));
            if self.peel && !self.peeled && items.len() > 1 {
                items.remove(0);
                self.peeled = true;
            }
            out.insert(key.clone(), Value::Array(vec![first]));
        }
        Value::Object(out)
    }
}
