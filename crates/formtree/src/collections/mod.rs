//! Collection descriptors: one flat, ordered entry per schema field.
//!
//! Collections are derived from the schema alone and drive table columns,
//! common-key hoisting and row flattening.

use formtree_xpath::{join_index, join_key};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::helpers::autocomplete::{binding_for, AutocompleteBinding};
use crate::helpers::{get_enum_values, parse_autocomplete, sort_by_sequence};
use crate::props::CallerProps;
use crate::schema::{DataType, ProjectSchema, SchemaNode};

/// Display metadata of one field, array or object of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub key: String,
    pub title: String,
    /// Dotted key path from the model root, without indices.
    pub table_title: String,
    /// Schema xpath with `[0]` for every array level.
    pub xpath: String,
    pub sequence_number: u32,
    #[serde(rename = "type")]
    pub kind: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlying_type: Option<DataType>,
    pub required: bool,
    pub hide: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_bar: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_complete: Option<String>,
    /// Enum values, or the static autocomplete set bound to this field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub server_populate: bool,
    pub orm_no_update: bool,
    pub ui_update_only: bool,
    pub no_common_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_field_id: Option<String>,
    /// Element schema fields of a JSON-abbreviated container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaNode>>,
    /// Collections under a JSON-abbreviated container, kept out of the
    /// parent's column list and numbered on their own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_collections: Option<Vec<Collection>>,
}

impl Collection {
    pub fn is_json_abbreviated(&self) -> bool {
        self.abbreviated.as_deref() == Some(crate::constants::JSON_ABBREVIATION)
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }
}

/// Collections of every field under `current`, depth first.
///
/// Fields are visited in `sequence_number` order at each level and numbered
/// from one shared counter, so the result is ordered by `sequence_number`.
///
/// # Errors
///
/// `FormTreeError::UnresolvedRef` when a container points at a missing
/// definition.
pub fn create_collections(
    schema: &ProjectSchema,
    current: &SchemaNode,
    props: &CallerProps,
) -> Result<Vec<Collection>> {
    let mut builder = CollectionBuilder {
        schema,
        edit: props.is_edit(),
        sequence: 1,
    };
    let mut out = Vec::new();
    builder.walk(current, &mut out, "", "", None)?;
    tracing::debug!(count = out.len(), "created collections");
    Ok(out)
}

/// [`create_collections`] for a model looked up by name.
pub fn create_model_collections(
    schema: &ProjectSchema,
    model_name: &str,
    props: &CallerProps,
) -> Result<Vec<Collection>> {
    create_collections(schema, schema.model(model_name)?, props)
}

struct CollectionBuilder<'a> {
    schema: &'a ProjectSchema,
    edit: bool,
    sequence: u32,
}

impl CollectionBuilder<'_> {
    fn walk(
        &mut self,
        container: &SchemaNode,
        out: &mut Vec<Collection>,
        title_prefix: &str,
        xpath_prefix: &str,
        meta_field_id: Option<&str>,
    ) -> Result<()> {
        for (key, prop) in sort_by_sequence(&container.properties) {
            let prop = prop.cascade_from(container);
            let table_title = join_key(title_prefix, key);
            let xpath = join_key(xpath_prefix, key);
            let meta_field_id = prop.mapping_underlying_meta_field.as_deref().or(meta_field_id);
            let mut collection =
                self.describe(container, key, &prop, &table_title, &xpath, meta_field_id)?;

            let element_xpath = match prop.data_type() {
                DataType::Array if self.schema.items_are_primitive(&prop)? => None,
                DataType::Array => Some(join_index(&xpath, 0)),
                DataType::Object => Some(xpath.clone()),
                _ => None,
            };
            let Some(element_xpath) = element_xpath else {
                self.push(out, collection);
                continue;
            };
            let element = self.schema.element_schema(&prop, &xpath)?;
            if prop.is_json_abbreviated() {
                let mut nested = CollectionBuilder {
                    schema: self.schema,
                    edit: self.edit,
                    sequence: 1,
                };
                let mut sub = Vec::new();
                nested.walk(&element, &mut sub, &table_title, &element_xpath, meta_field_id)?;
                collection.properties = Some(element.properties.clone());
                collection.sub_collections = Some(sub);
                self.push(out, collection);
            } else {
                self.push(out, collection);
                self.walk(&element, out, &table_title, &element_xpath, meta_field_id)?;
            }
        }
        Ok(())
    }

    fn describe(
        &self,
        container: &SchemaNode,
        key: &str,
        prop: &SchemaNode,
        table_title: &str,
        xpath: &str,
        meta_field_id: Option<&str>,
    ) -> Result<Collection> {
        let kind = prop.data_type();
        let options = if kind == DataType::Enum {
            Some(get_enum_values(self.schema, prop)?)
        } else {
            prop.auto_complete.as_deref().and_then(|declaration| {
                match binding_for(&parse_autocomplete(declaration), key)? {
                    AutocompleteBinding::Static(set) => {
                        self.schema.autocomplete_options(set).map(<[String]>::to_vec)
                    }
                    AutocompleteBinding::Dynamic(_) => None,
                }
            })
        };
        Ok(Collection {
            key: key.to_string(),
            title: prop.display_title(key),
            table_title: table_title.to_string(),
            xpath: xpath.to_string(),
            sequence_number: 0,
            kind,
            underlying_type: prop.underlying_type,
            required: container.is_required(key),
            hide: prop.is_hidden(),
            help: prop.help.clone(),
            placeholder: prop.placeholder.clone(),
            default: prop.default.clone(),
            min: prop.min.clone(),
            max: prop.max.clone(),
            color: prop.color.clone(),
            button: prop.button.clone(),
            progress_bar: prop.progress_bar.clone(),
            auto_complete: prop.auto_complete.clone(),
            options,
            server_populate: prop.is_server_populate(),
            orm_no_update: prop.is_orm_no_update(),
            ui_update_only: prop.is_ui_update_only(),
            no_common_key: prop.is_no_common_key(),
            abbreviated: prop.abbreviated.clone(),
            meta_field_id: meta_field_id.map(str::to_string),
            properties: None,
            sub_collections: None,
        })
    }

    /// Number and append `collection` unless it is suppressed.
    fn push(&mut self, out: &mut Vec<Collection>, mut collection: Collection) {
        if out.iter().any(|c| c.table_title == collection.table_title) {
            tracing::trace!(table_title = %collection.table_title, "skipping duplicate collection");
            return;
        }
        if self.edit && collection.server_populate {
            tracing::trace!(table_title = %collection.table_title, "skipping server populated");
            return;
        }
        collection.sequence_number = self.sequence;
        self.sequence += 1;
        out.push(collection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ProjectSchema {
        ProjectSchema::from_value(json!({
            "Strat": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "legs": {"type": "array", "items": {"$ref": "#/definitions/Leg"}, "sequence_number": 2},
                    "name": {"type": "string", "sequence_number": 1, "auto_complete": "name:Names"},
                    "side": {"type": "enum", "items": {"$ref": "#/definitions/Side"}, "sequence_number": 3},
                    "meta": {"type": "object", "items": {"$ref": "#/definitions/Meta"}, "abbreviated": "JSON",
                             "sequence_number": 4},
                    "created": {"type": "date-time", "server_populate": true, "sequence_number": 5}
                }
            },
            "definitions": {
                "Leg": {"type": "object", "properties": {
                    "px": {"type": "number"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                }},
                "Side": {"type": "string", "enum": ["BUY", "SELL"]},
                "Meta": {"type": "object", "properties": {"a": {"type": "string"}, "b": {"type": "number"}}}
            },
            "autocomplete": {"Names": ["alpha", "beta"]}
        }))
        .unwrap()
    }

    #[test]
    fn test_order_xpaths_and_titles() {
        let collections =
            create_model_collections(&schema(), "Strat", &CallerProps::read()).unwrap();
        let xpaths: Vec<_> = collections.iter().map(|c| c.xpath.as_str()).collect();
        assert_eq!(
            xpaths,
            vec!["name", "legs", "legs[0].px", "legs[0].tags", "side", "meta", "created"]
        );
        let titles: Vec<_> = collections.iter().map(|c| c.table_title.as_str()).collect();
        assert_eq!(titles[2], "legs.px");
        let numbers: Vec<_> = collections.iter().map(|c| c.sequence_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_options_and_required() {
        let collections =
            create_model_collections(&schema(), "Strat", &CallerProps::read()).unwrap();
        let name = &collections[0];
        assert!(name.required);
        assert_eq!(name.options, Some(vec!["alpha".to_string(), "beta".to_string()]));
        let side = collections.iter().find(|c| c.key == "side").unwrap();
        assert_eq!(side.options, Some(vec!["BUY".to_string(), "SELL".to_string()]));
    }

    #[test]
    fn test_json_abbreviated_gets_sub_collections() {
        let collections =
            create_model_collections(&schema(), "Strat", &CallerProps::read()).unwrap();
        let meta = collections.iter().find(|c| c.key == "meta").unwrap();
        assert!(meta.is_json_abbreviated());
        let sub = meta.sub_collections.as_ref().unwrap();
        let xpaths: Vec<_> = sub.iter().map(|c| c.xpath.as_str()).collect();
        assert_eq!(xpaths, vec!["meta.a", "meta.b"]);
        assert!(collections.iter().all(|c| c.xpath != "meta.a"));
        assert_eq!(meta.properties.as_ref().map(IndexMap::len), Some(2));
    }

    #[test]
    fn test_server_populate_suppressed_in_edit() {
        let collections =
            create_model_collections(&schema(), "Strat", &CallerProps::edit()).unwrap();
        assert!(collections.iter().all(|c| c.key != "created"));
    }

    #[test]
    fn test_unresolved_ref_is_fatal() {
        let schema = ProjectSchema::from_value(json!({
            "M": {"type": "object", "properties": {
                "x": {"type": "object", "items": {"$ref": "#/definitions/Nope"}}
            }}
        }))
        .unwrap();
        assert!(create_model_collections(&schema, "M", &CallerProps::read()).is_err());
    }
}
