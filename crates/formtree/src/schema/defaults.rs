use serde_json::{Map, Value};

use super::types::{DataType, ProjectSchema, SchemaNode};
use crate::error::Result;

/// Build the default instance of an object schema.
///
/// - an explicit `default` wins
/// - primitives start as `null`, arrays as `[]`
/// - required nested objects are generated recursively, optional ones are `null`
/// - `server_populate` and `ui_update_only` fields are left out; the user
///   cannot create them
///
/// # Example
///
/// ```
/// use formtree::{generate_object_from_schema, ProjectSchema};
/// use serde_json::json;
///
/// let schema = ProjectSchema::from_value(json!({
///     "Order": {
///         "type": "object",
///         "required": ["limits"],
///         "properties": {
///             "id": {"type": "integer", "server_populate": true},
///             "qty": {"type": "integer", "default": 1},
///             "note": {"type": "string"},
///             "fills": {"type": "array", "items": {"$ref": "#/definitions/Fill"}},
///             "limits": {"type": "object", "items": {"$ref": "#/definitions/Limits"}},
///             "extra": {"type": "object", "items": {"$ref": "#/definitions/Limits"}}
///         }
///     },
///     "definitions": {
///         "Fill": {"type": "object", "properties": {"px": {"type": "number"}}},
///         "Limits": {"type": "object", "properties": {"max_px": {"type": "number"}}}
///     }
/// })).unwrap();
///
/// let order = generate_object_from_schema(&schema, schema.model("Order").unwrap()).unwrap();
/// assert_eq!(order, json!({
///     "qty": 1,
///     "note": null,
///     "fills": [],
///     "limits": {"max_px": null},
///     "extra": null
/// }));
/// ```
pub fn generate_object_from_schema(schema: &ProjectSchema, node: &SchemaNode) -> Result<Value> {
    let mut object = Map::new();
    for (name, prop) in &node.properties {
        let prop = prop.cascade_from(node);
        if prop.is_server_populate() || prop.is_ui_update_only() {
            continue;
        }
        if let Some(default) = &prop.default {
            object.insert(name.clone(), default.clone());
            continue;
        }
        let value = match prop.data_type() {
            DataType::Array => Value::Array(Vec::new()),
            DataType::Object if node.is_required(name) => {
                let element = schema.element_schema(&prop, name)?;
                generate_object_from_schema(schema, &element)?
            }
            _ => Value::Null,
        };
        object.insert(name.clone(), value);
    }
    Ok(Value::Object(object))
}

/// Generate any required nested object that is missing or `null` in `value`.
///
/// Used after duplicating an element: the copy may carry a `null` where the
/// schema insists on an object.
pub fn fill_required_objects(
    schema: &ProjectSchema,
    node: &SchemaNode,
    value: &mut Value,
) -> Result<()> {
    let Value::Object(map) = value else {
        return Ok(());
    };
    for (name, prop) in &node.properties {
        let prop = prop.cascade_from(node);
        if prop.data_type() != DataType::Object || prop.is_server_populate() {
            continue;
        }
        let element = schema.element_schema(&prop, name)?;
        match map.get_mut(name) {
            Some(child) if child.is_object() => fill_required_objects(schema, &element, child)?,
            _ if node.is_required(name) => {
                map.insert(name.clone(), generate_object_from_schema(schema, &element)?);
            }
            _ => {}
        }
    }
    Ok(())
}
