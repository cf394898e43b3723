use crate::error::Result;
use crate::schema::{ProjectSchema, SchemaNode};

/// The allowed values of an enum field.
///
/// The node's own `enum` list wins; otherwise the list on the definition
/// its `items.$ref` (or `$ref`) points at. Nodes with neither have none.
pub fn get_enum_values(schema: &ProjectSchema, node: &SchemaNode) -> Result<Vec<String>> {
    if let Some(values) = &node.enum_values {
        return Ok(values.clone());
    }
    let reference = node
        .items
        .as_ref()
        .and_then(|items| items.reference.as_deref())
        .or(node.reference.as_deref());
    match reference {
        Some(reference) => Ok(schema
            .resolve_ref(reference)?
            .enum_values
            .clone()
            .unwrap_or_default()),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enum_values_via_ref_and_inline() {
        let schema = ProjectSchema::from_value(json!({
            "definitions": {"Side": {"type": "string", "enum": ["BUY", "SELL"]}}
        }))
        .unwrap();
        let by_ref: SchemaNode = serde_json::from_value(json!({
            "type": "enum", "items": {"$ref": "#/definitions/Side"}
        }))
        .unwrap();
        assert_eq!(get_enum_values(&schema, &by_ref).unwrap(), vec!["BUY", "SELL"]);

        let inline: SchemaNode =
            serde_json::from_value(json!({"type": "enum", "enum": ["X"]})).unwrap();
        assert_eq!(get_enum_values(&schema, &inline).unwrap(), vec!["X"]);

        let dangling: SchemaNode = serde_json::from_value(json!({
            "type": "enum", "items": {"$ref": "#/definitions/Gone"}
        }))
        .unwrap();
        assert!(get_enum_values(&schema, &dangling).is_err());
    }
}
