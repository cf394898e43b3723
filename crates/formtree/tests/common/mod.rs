#![allow(dead_code)]

use formtree::{CallerProps, ProjectSchema, TreeContext, TreeNode};
use formtree_xpath::add_xpath;
use serde_json::{json, Value};

/// `Doc` holds a repeated `foo` of `Bar` documents, an optional `bar`
/// object, a server populated `id` and a couple of plain fields.
pub fn project() -> ProjectSchema {
    ProjectSchema::from_value(json!({
        "Doc": {
            "type": "object",
            "properties": {
                "id": {"type": "integer", "server_populate": true},
                "status": {"type": "string"},
                "qty": {"type": "integer"},
                "foo": {"type": "array", "items": {"$ref": "#/definitions/Bar"}},
                "bar": {"type": "object", "items": {"$ref": "#/definitions/Opt"}}
            }
        },
        "definitions": {
            "Bar": {"type": "object", "properties": {"name": {"type": "string"}}},
            "Opt": {"type": "object", "properties": {"x": {"type": "integer"}, "y": {"type": "string"}}}
        }
    }))
    .unwrap()
}

pub fn annotated(value: &Value) -> Value {
    let mut value = value.clone();
    add_xpath(&mut value, "");
    value
}

pub fn tree(schema: &ProjectSchema, stored: &Value, live: &Value, props: &CallerProps) -> TreeNode {
    let ctx = TreeContext::new(stored, live, props);
    let mut roots = formtree::generate_tree_structure(schema, "Doc", &ctx).unwrap();
    assert_eq!(roots.len(), 1);
    roots.remove(0)
}

pub fn leaves(root: &TreeNode) -> Vec<&formtree::LeafNode> {
    let mut out = Vec::new();
    root.walk(&mut |node| {
        if let Some(leaf) = node.as_leaf() {
            out.push(leaf);
        }
    });
    out
}
