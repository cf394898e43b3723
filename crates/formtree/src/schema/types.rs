use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::JSON_ABBREVIATION;
use crate::error::{FormTreeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
    Enum,
    #[serde(rename = "date-time")]
    DateTime,
    Object,
    Array,
}

impl DataType {
    pub fn is_primitive(self) -> bool {
        !self.is_container()
    }

    pub fn is_container(self) -> bool {
        matches!(self, DataType::Object | DataType::Array)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Number | DataType::Integer)
    }
}

/// One node of a recursive schema.
///
/// Flags that cascade from a container to its fields are kept as `Option`
/// so "unset" and "explicitly false" stay distinguishable until
/// [`SchemaNode::cascade_from`] resolves them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<f64>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_populate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_update_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orm_no_update: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_complete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_bar: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_common_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_underlying_meta_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlying_type: Option<DataType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaNode {
    /// Declared type; untyped nodes with properties or a `$ref` are objects,
    /// anything else untyped is a string.
    pub fn data_type(&self) -> DataType {
        match self.kind {
            Some(kind) => kind,
            None if !self.properties.is_empty() || self.reference.is_some() => DataType::Object,
            None => DataType::String,
        }
    }

    pub fn display_title(&self, key: &str) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| formtree_util::title_case(key))
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|name| name == field)
    }

    pub fn is_hidden(&self) -> bool {
        self.hide.unwrap_or(false)
    }

    pub fn is_server_populate(&self) -> bool {
        self.server_populate.unwrap_or(false)
    }

    pub fn is_ui_update_only(&self) -> bool {
        self.ui_update_only.unwrap_or(false)
    }

    pub fn is_orm_no_update(&self) -> bool {
        self.orm_no_update.unwrap_or(false)
    }

    pub fn is_no_common_key(&self) -> bool {
        self.no_common_key.unwrap_or(false)
    }

    pub fn is_json_abbreviated(&self) -> bool {
        self.abbreviated.as_deref() == Some(JSON_ABBREVIATION)
    }

    /// Copy of `self` with every unset cascading flag taken from `parent`.
    ///
    /// The child's own value always wins. Only one level is resolved per
    /// call; the walkers call this once per recursion step.
    pub fn cascade_from(&self, parent: &SchemaNode) -> SchemaNode {
        let mut child = self.clone();
        inherit(&mut child.server_populate, &parent.server_populate);
        inherit(&mut child.ui_update_only, &parent.ui_update_only);
        inherit(&mut child.orm_no_update, &parent.orm_no_update);
        inherit(&mut child.auto_complete, &parent.auto_complete);
        inherit(&mut child.hide, &parent.hide);
        inherit(&mut child.no_common_key, &parent.no_common_key);
        inherit(&mut child.color, &parent.color);
        inherit(&mut child.button, &parent.button);
        inherit(&mut child.progress_bar, &parent.progress_bar);
        inherit(&mut child.help, &parent.help);
        child
    }
}

fn inherit<T: Clone>(slot: &mut Option<T>, parent: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(parent);
    }
}

/// Models, definitions and option sets of one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSchema {
    #[serde(default)]
    pub definitions: IndexMap<String, SchemaNode>,
    #[serde(default)]
    pub autocomplete: IndexMap<String, Vec<String>>,
    #[serde(flatten)]
    pub models: IndexMap<String, SchemaNode>,
}

impl ProjectSchema {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|err| FormTreeError::InvalidSchema(err.to_string()))
    }

    pub fn model(&self, name: &str) -> Result<&SchemaNode> {
        self.models
            .get(name)
            .ok_or_else(|| FormTreeError::ModelNotFound(name.to_string()))
    }

    /// Resolve `#/definitions/<name>`, `#/<model>` or a bare `<name>`.
    ///
    /// Definitions are searched before models.
    pub fn resolve_ref(&self, reference: &str) -> Result<&SchemaNode> {
        let trimmed = reference.trim_start_matches('#').trim_start_matches('/');
        let name = trimmed.strip_prefix("definitions/").unwrap_or(trimmed);
        let name = name.rsplit('/').next().unwrap_or(name);
        self.definitions
            .get(name)
            .or_else(|| self.models.get(name))
            .ok_or_else(|| FormTreeError::UnresolvedRef(reference.to_string()))
    }

    /// The schema describing one element (array) or the value (object) of
    /// a container node, with the container's cascading flags applied.
    pub fn element_schema(&self, node: &SchemaNode, at: &str) -> Result<SchemaNode> {
        let item_ref = node.items.as_ref().and_then(|i| i.reference.as_deref());
        let element = if let Some(reference) = item_ref {
            self.resolve_ref(reference)?.clone()
        } else if let Some(reference) = node.reference.as_deref() {
            self.resolve_ref(reference)?.clone()
        } else if let Some(items) = node.items.as_deref().filter(|i| !i.properties.is_empty()) {
            items.clone()
        } else if !node.properties.is_empty() {
            node.clone()
        } else {
            return Err(FormTreeError::NotAContainer(at.to_string()));
        };
        Ok(element.cascade_from(node))
    }

    /// Schema of the primitive values held by an array of primitives.
    pub fn primitive_item_schema(&self, node: &SchemaNode) -> Result<SchemaNode> {
        let item = match node.items.as_deref() {
            Some(items) => match items.reference.as_deref() {
                Some(reference) => self.resolve_ref(reference)?.clone(),
                None => items.clone(),
            },
            None => SchemaNode {
                kind: node.underlying_type,
                ..SchemaNode::default()
            },
        };
        Ok(item.cascade_from(node))
    }

    /// Check if an array node holds primitives rather than documents.
    pub fn items_are_primitive(&self, node: &SchemaNode) -> Result<bool> {
        let Some(items) = node.items.as_deref() else {
            return Ok(node.properties.is_empty() && node.reference.is_none());
        };
        let target = match items.reference.as_deref() {
            Some(reference) => self.resolve_ref(reference)?,
            None => items,
        };
        Ok(target.properties.is_empty() && target.data_type().is_primitive())
    }

    pub fn autocomplete_options(&self, option_set: &str) -> Option<&[String]> {
        self.autocomplete.get(option_set).map(Vec::as_slice)
    }
}
