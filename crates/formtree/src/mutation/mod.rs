//! Structural edits of the live document.
//!
//! Array elements are appended under a schema xpath index that no stored
//! or live element has used, so schema xpaths stay unique across any
//! sequence of add, duplicate and remove. Optional objects are removed by
//! nulling them and recreated from their schema defaults.

use formtree_xpath::{
    add_xpath, clear_xpath, element_xpath, get_by_xpath, get_by_xpath_mut, join_index, last_index,
    remove_by_xpath, set_by_xpath,
};
use serde_json::Value;

use crate::constants::DB_ID;
use crate::error::{FormTreeError, Result};
use crate::schema::{fill_required_objects, generate_object_from_schema, ProjectSchema, SchemaNode};
use crate::view_state::ViewState;

/// Schema xpath index for the next element of an array.
///
/// The largest of the live length, the stored length, and one past the
/// highest index recorded in a live element's side-channels.
///
/// ```
/// use formtree::next_array_index;
/// use serde_json::json;
///
/// // Element 0 was removed; the survivor still records index 1.
/// let live = vec![json!({"name": "b", "xpath_name": "foo[1].name"})];
/// let stored = vec![json!({"name": "a"}), json!({"name": "b"})];
/// assert_eq!(next_array_index(&live, Some(&stored)), 2);
/// assert_eq!(next_array_index(&[], None), 0);
/// ```
pub fn next_array_index(live_items: &[Value], stored_items: Option<&[Value]>) -> usize {
    let recorded = live_items
        .iter()
        .filter_map(|item| element_xpath(item).and_then(|xpath| last_index(&xpath)))
        .map(|idx| idx + 1)
        .max()
        .unwrap_or(0);
    live_items
        .len()
        .max(stored_items.map_or(0, <[Value]>::len))
        .max(recorded)
}

fn live_array<'v>(live: &'v mut Value, data_xpath: &str) -> Result<&'v mut Vec<Value>> {
    let slot = get_by_xpath_mut(live, data_xpath)
        .ok_or_else(|| FormTreeError::NotFound(data_xpath.to_string()))?;
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    slot.as_array_mut()
        .ok_or_else(|| FormTreeError::NotAnArray(data_xpath.to_string()))
}

fn stored_items<'v>(stored: &'v Value, xpath: &str) -> Option<&'v [Value]> {
    get_by_xpath(stored, xpath).and_then(Value::as_array).map(Vec::as_slice)
}

/// Append a default element to the array at `data_xpath`.
///
/// Returns the new element's schema xpath. Arrays of primitives get the
/// item default (or `null`) at the next position.
///
/// # Errors
///
/// - `FormTreeError::NotFound` when nothing is live at `data_xpath`
/// - `FormTreeError::NotAnArray` when the live value is not an array
pub fn add_array_item(
    schema: &ProjectSchema,
    array_node: &SchemaNode,
    live: &mut Value,
    stored: &Value,
    xpath: &str,
    data_xpath: &str,
) -> Result<String> {
    if schema.items_are_primitive(array_node)? {
        let item = schema.primitive_item_schema(array_node)?;
        let items = live_array(live, data_xpath)?;
        items.push(item.default.unwrap_or(Value::Null));
        return Ok(join_index(xpath, items.len() - 1));
    }
    let element = schema.element_schema(array_node, xpath)?;
    let mut value = generate_object_from_schema(schema, &element)?;
    let stored_slice = stored_items(stored, xpath);
    let items = live_array(live, data_xpath)?;
    let new_xpath = join_index(xpath, next_array_index(items, stored_slice));
    add_xpath(&mut value, &new_xpath);
    items.push(value);
    tracing::debug!(xpath = %new_xpath, "added array item");
    Ok(new_xpath)
}

/// Append a copy of the live element at `item_data_xpath` to its array.
///
/// The copy loses its side-channels and every `_id` it contains, gets any
/// missing required objects generated, and is annotated under the next
/// free schema index, which is returned.
pub fn duplicate_array_item(
    schema: &ProjectSchema,
    array_node: &SchemaNode,
    live: &mut Value,
    stored: &Value,
    xpath: &str,
    data_xpath: &str,
    item_data_xpath: &str,
) -> Result<String> {
    let mut copy = get_by_xpath(live, item_data_xpath)
        .cloned()
        .ok_or_else(|| FormTreeError::NotFound(item_data_xpath.to_string()))?;
    if schema.items_are_primitive(array_node)? {
        let items = live_array(live, data_xpath)?;
        items.push(copy);
        return Ok(join_index(xpath, items.len() - 1));
    }
    clear_xpath(&mut copy);
    strip_ids(&mut copy);
    let element = schema.element_schema(array_node, xpath)?;
    fill_required_objects(schema, &element, &mut copy)?;
    let stored_slice = stored_items(stored, xpath);
    let items = live_array(live, data_xpath)?;
    let new_xpath = join_index(xpath, next_array_index(items, stored_slice));
    add_xpath(&mut copy, &new_xpath);
    items.push(copy);
    tracing::debug!(source = item_data_xpath, xpath = %new_xpath, "duplicated array item");
    Ok(new_xpath)
}

fn strip_ids(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.shift_remove(DB_ID);
            map.values_mut().for_each(strip_ids);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_ids),
        _ => {}
    }
}

/// Remove the live element at `item_data_xpath` and forget the view state
/// under its schema xpath. Returns the removed element.
pub fn remove_array_item(
    live: &mut Value,
    item_data_xpath: &str,
    item_xpath: &str,
    view: Option<&mut ViewState>,
) -> Result<Value> {
    let removed = remove_by_xpath(live, item_data_xpath)?;
    if let Some(view) = view {
        view.forget(item_xpath);
    }
    tracing::debug!(xpath = item_xpath, "removed array item");
    Ok(removed)
}

/// Null the optional object at `data_xpath`.
pub fn remove_object(
    live: &mut Value,
    data_xpath: &str,
    xpath: &str,
    view: Option<&mut ViewState>,
) -> Result<()> {
    if get_by_xpath(live, data_xpath).is_none() {
        return Err(FormTreeError::NotFound(data_xpath.to_string()));
    }
    set_by_xpath(live, data_xpath, Value::Null)?;
    if let Some(view) = view {
        view.forget(xpath);
    }
    Ok(())
}

/// Replace the object at `data_xpath` with a fresh default instance and
/// mark it expanded.
pub fn recreate_object(
    schema: &ProjectSchema,
    object_node: &SchemaNode,
    live: &mut Value,
    data_xpath: &str,
    xpath: &str,
    view: Option<&mut ViewState>,
) -> Result<()> {
    let element = schema.element_schema(object_node, xpath)?;
    let mut value = generate_object_from_schema(schema, &element)?;
    add_xpath(&mut value, xpath);
    set_by_xpath(live, data_xpath, value)?;
    if let Some(view) = view {
        view.forget(xpath);
        view.expand(xpath);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ProjectSchema {
        ProjectSchema::from_value(json!({
            "M": {
                "type": "object",
                "properties": {
                    "foo": {"type": "array", "items": {"$ref": "#/definitions/Bar"}},
                    "tags": {"type": "array", "items": {"type": "string", "default": "new"}},
                    "opt": {"type": "object", "items": {"$ref": "#/definitions/Opt"}}
                }
            },
            "definitions": {
                "Bar": {
                    "type": "object",
                    "required": ["inner"],
                    "properties": {
                        "name": {"type": "string"},
                        "inner": {"type": "object", "items": {"$ref": "#/definitions/Opt"}},
                        "subs": {"type": "array", "items": {"$ref": "#/definitions/Opt"}}
                    }
                },
                "Opt": {"type": "object", "properties": {"v": {"type": "integer", "default": 0}}}
            }
        }))
        .unwrap()
    }

    fn prop<'a>(schema: &'a ProjectSchema, name: &str) -> &'a SchemaNode {
        &schema.model("M").unwrap().properties[name]
    }

    fn annotated(mut value: Value) -> Value {
        add_xpath(&mut value, "");
        value
    }

    #[test]
    fn test_add_after_removal_skips_used_index() {
        let schema = schema();
        let stored = json!({"foo": [{"name": "a"}, {"name": "b"}]});
        let mut live = annotated(stored.clone());
        remove_array_item(&mut live, "foo[1]", "foo[1]", None).unwrap();
        let foo = prop(&schema, "foo");
        let xpath = add_array_item(&schema, foo, &mut live, &stored, "foo", "foo").unwrap();
        assert_eq!(xpath, "foo[2]");
        assert_eq!(live["foo"][1]["xpath_name"], json!("foo[2].name"));
        assert_eq!(live["foo"][1]["inner"], json!({"v": 0, "xpath_v": "foo[2].inner.v"}));
    }

    #[test]
    fn test_duplicate_strips_ids_and_fills_required() {
        let schema = schema();
        let stored = json!({
            "foo": [{"_id": 1, "name": "a", "inner": null, "subs": [{"_id": 5, "v": 1}]}]
        });
        let mut live = annotated(stored.clone());
        let foo = prop(&schema, "foo");
        let xpath =
            duplicate_array_item(&schema, foo, &mut live, &stored, "foo", "foo", "foo[0]").unwrap();
        assert_eq!(xpath, "foo[1]");
        let mut copy = live["foo"][1].clone();
        clear_xpath(&mut copy);
        assert_eq!(copy, json!({"name": "a", "inner": {"v": 0}, "subs": [{"v": 1}]}));
        assert_eq!(element_xpath(&live["foo"][1]).as_deref(), Some("foo[1]"));
    }

    #[test]
    fn test_primitive_arrays() {
        let schema = schema();
        let stored = json!({"tags": []});
        let mut live = stored.clone();
        let tags = prop(&schema, "tags");
        assert_eq!(
            add_array_item(&schema, tags, &mut live, &stored, "tags", "tags").unwrap(),
            "tags[0]"
        );
        duplicate_array_item(&schema, tags, &mut live, &stored, "tags", "tags", "tags[0]").unwrap();
        assert_eq!(live, json!({"tags": ["new", "new"]}));
    }

    #[test]
    fn test_remove_and_recreate_object() {
        let schema = schema();
        let mut live = annotated(json!({"opt": {"v": 3}}));
        let mut view = ViewState::new();
        view.expand("opt");
        view.set_transient("opt.v", json!("typing"));
        remove_object(&mut live, "opt", "opt", Some(&mut view)).unwrap();
        assert_eq!(live["opt"], Value::Null);
        assert_eq!(view.is_open("opt"), None);
        assert_eq!(view.transient("opt.v"), None);

        let opt = prop(&schema, "opt");
        recreate_object(&schema, opt, &mut live, "opt", "opt", Some(&mut view)).unwrap();
        assert_eq!(live["opt"], json!({"v": 0, "xpath_v": "opt.v"}));
        assert_eq!(view.is_open("opt"), Some(true));
    }

    #[test]
    fn test_errors() {
        let schema = schema();
        let stored = json!({});
        let mut live = json!({"foo": {"not": "array"}});
        assert_eq!(
            add_array_item(&schema, prop(&schema, "foo"), &mut live, &stored, "foo", "foo"),
            Err(FormTreeError::NotAnArray("foo".into()))
        );
        assert_eq!(
            remove_object(&mut live, "missing", "missing", None),
            Err(FormTreeError::NotFound("missing".into()))
        );
    }
}
