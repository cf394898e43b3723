use std::collections::HashSet;

use formtree_xpath::{
    element_xpath, get_by_xpath, get_data_xpath, join_index, join_key, join_placeholder,
};
use serde_json::Value;

use super::subtree::is_node_in_subtree;
use super::types::{Affordances, HeaderNode, LeafNode, ModificationState, TreeNode};
use crate::diff::compare_nodes;
use crate::error::Result;
use crate::helpers::autocomplete::resolve_options;
use crate::helpers::{color_for_value, get_enum_values, sort_by_sequence};
use crate::props::CallerProps;
use crate::schema::{DataType, ProjectSchema, SchemaNode};
use crate::validation::validate_constraints;
use crate::view_state::ViewState;

/// The two snapshots and the render configuration of one tree generation.
///
/// `live` must be annotated with [`formtree_xpath::add_xpath`]; array
/// elements without side-channels cannot be matched to a schema position
/// and are left out.
#[derive(Debug, Clone, Copy)]
pub struct TreeContext<'a> {
    pub stored: &'a Value,
    pub live: &'a Value,
    pub props: &'a CallerProps,
    pub view: Option<&'a ViewState>,
}

impl<'a> TreeContext<'a> {
    pub fn new(stored: &'a Value, live: &'a Value, props: &'a CallerProps) -> Self {
        Self {
            stored,
            live,
            props,
            view: None,
        }
    }

    pub fn with_view(mut self, view: &'a ViewState) -> Self {
        self.view = Some(view);
        self
    }
}

/// Build the tree of `model_name`: a single root header holding the
/// model's fields.
///
/// # Errors
///
/// - `FormTreeError::ModelNotFound` for an unknown model
/// - `FormTreeError::UnresolvedRef` when a container points at a missing
///   definition
pub fn generate_tree_structure(
    schema: &ProjectSchema,
    model_name: &str,
    ctx: &TreeContext<'_>,
) -> Result<Vec<TreeNode>> {
    let model = schema.model(model_name)?;
    tracing::debug!(model = model_name, mode = ?ctx.props.mode, "generating tree");
    let builder = TreeBuilder { schema, ctx: *ctx };
    let mut root = builder.header(
        model_name,
        model.display_title(model_name),
        DataType::Object,
        String::new(),
        Some(String::new()),
    );
    root.id = model_name.to_string();
    root.children = builder.properties(model, "", Some(""))?;
    Ok(vec![TreeNode::Header(root)])
}

struct TreeBuilder<'a> {
    schema: &'a ProjectSchema,
    ctx: TreeContext<'a>,
}

impl<'a> TreeBuilder<'a> {
    fn edit(&self) -> bool {
        self.ctx.props.is_edit()
    }

    fn stored_at(&self, xpath: &str) -> Option<&'a Value> {
        get_by_xpath(self.ctx.stored, xpath)
    }

    fn live_at(&self, data_xpath: Option<&str>) -> Option<&'a Value> {
        data_xpath.and_then(|d| get_by_xpath(self.ctx.live, d))
    }

    fn in_focus(&self, xpath: &str) -> bool {
        match self.ctx.props.xpath.as_deref() {
            Some(focus) => is_node_in_subtree(focus, self.ctx.props.subtree.as_ref(), xpath),
            None => true,
        }
    }

    /// Visibility rules shared by leaves and headers.
    fn is_visible(&self, node: &SchemaNode, stored: Option<&Value>, live: Option<&Value>) -> bool {
        if self.ctx.props.hide && node.is_hidden() {
            return false;
        }
        if self.edit() && node.is_server_populate() {
            return false;
        }
        if self.edit() && node.is_ui_update_only() && stored.is_none() {
            return false;
        }
        stored.is_some() || live.is_some()
    }

    fn header(
        &self,
        key: &str,
        title: String,
        kind: DataType,
        xpath: String,
        data_xpath: Option<String>,
    ) -> HeaderNode {
        let is_open = self
            .ctx
            .view
            .and_then(|view| view.is_open(&xpath))
            .unwrap_or(self.ctx.props.is_open);
        HeaderNode {
            id: xpath.clone(),
            key: key.to_string(),
            title,
            kind,
            xpath,
            data_xpath,
            is_open,
            required: false,
            state: ModificationState::Unmodified,
            affordances: Affordances::default(),
            is_array_item: false,
            placeholder: false,
            children: Vec::new(),
        }
    }

    /// Nodes for every field of `container`, in display order.
    fn properties(
        &self,
        container: &SchemaNode,
        xpath: &str,
        data_xpath: Option<&str>,
    ) -> Result<Vec<TreeNode>> {
        let parent_live = self.live_at(data_xpath);
        let mut nodes = Vec::new();
        for (key, prop) in sort_by_sequence(&container.properties) {
            let prop = prop.cascade_from(container);
            let child_xpath = join_key(xpath, key);
            if !self.in_focus(&child_xpath) {
                continue;
            }
            let child_data = data_xpath.map(|d| join_key(d, key));
            let required = container.is_required(key);
            let node = match prop.data_type() {
                DataType::Object => {
                    self.object_node(key, &prop, child_xpath, child_data, required)?
                }
                DataType::Array if self.schema.items_are_primitive(&prop)? => self
                    .primitive_array_node(
                        key,
                        &prop,
                        child_xpath,
                        child_data,
                        required,
                        parent_live,
                    )?,
                DataType::Array => self.array_node(key, &prop, child_xpath, child_data, required)?,
                _ => self
                    .leaf(key, &prop, child_xpath, child_data, required, parent_live)?
                    .map(TreeNode::Leaf),
            };
            nodes.extend(node);
        }
        Ok(nodes)
    }

    fn leaf(
        &self,
        key: &str,
        prop: &SchemaNode,
        xpath: String,
        data_xpath: Option<String>,
        required: bool,
        parent_live: Option<&Value>,
    ) -> Result<Option<LeafNode>> {
        let stored = self.stored_at(&xpath);
        let live = self.live_at(data_xpath.as_deref());
        if !self.is_visible(prop, stored, live) {
            tracing::trace!(xpath = %xpath, "leaf not visible");
            return Ok(None);
        }
        let state = compare_nodes(stored, live);
        let value = match state {
            ModificationState::Removed => stored,
            _ => live,
        }
        .cloned()
        .unwrap_or(Value::Null);
        let disabled = !self.edit()
            || state == ModificationState::Removed
            || (prop.is_orm_no_update() && stored.is_some())
            || (prop.is_ui_update_only() && stored.is_none());
        let kind = prop.data_type();
        let options = if kind == DataType::Enum {
            Some(get_enum_values(self.schema, prop)?).filter(|values| !values.is_empty())
        } else {
            prop.auto_complete
                .as_deref()
                .and_then(|declaration| resolve_options(self.schema, declaration, key, parent_live))
        };
        let mut leaf = LeafNode {
            id: xpath.clone(),
            key: key.to_string(),
            title: prop.display_title(key),
            kind,
            underlying_type: prop.underlying_type,
            xpath,
            data_xpath,
            color: prop.color.as_deref().and_then(|rules| color_for_value(rules, Some(&value))),
            value,
            required,
            disabled,
            state,
            options,
            min: resolve_bound(prop.min.as_ref(), parent_live),
            max: resolve_bound(prop.max.as_ref(), parent_live),
            help: prop.help.clone(),
            placeholder: prop.placeholder.clone(),
            button: prop.button.clone(),
            progress_bar: prop.progress_bar.clone(),
            validation_error: None,
        };
        if self.edit() && !disabled {
            leaf.validation_error = validate_constraints(&leaf)
                .err()
                .map(|violation| violation.to_string());
        }
        Ok(Some(leaf))
    }

    /// An object field. A live `null` is a removed (or not yet created)
    /// optional object and gets no children.
    fn object_node(
        &self,
        key: &str,
        prop: &SchemaNode,
        xpath: String,
        data_xpath: Option<String>,
        required: bool,
    ) -> Result<Option<TreeNode>> {
        let stored = self.stored_at(&xpath);
        let live = self.live_at(data_xpath.as_deref());
        if !self.is_visible(prop, stored, live) {
            return Ok(None);
        }
        let stored_object = stored.filter(|v| !v.is_null());
        let live_object = live.filter(|v| !v.is_null());
        let mut header =
            self.header(key, prop.display_title(key), DataType::Object, xpath, data_xpath);
        header.required = required;
        header.state = compare_nodes(stored_object, live_object);
        if self.edit() && header.data_xpath.is_some() {
            let (add, remove) = match (stored_object, live_object) {
                (None, None) => (true, false),
                (None, Some(_)) => (false, !required),
                (Some(_), _) if prop.is_orm_no_update() => (false, false),
                (Some(_), None) => (true, false),
                (Some(_), Some(_)) => (false, !required),
            };
            header.affordances.add = add;
            header.affordances.remove = remove;
        }
        if live_object.is_some() {
            let element = self.schema.element_schema(prop, &header.xpath)?;
            header.children =
                self.properties(&element, &header.xpath, header.data_xpath.as_deref())?;
        }
        Ok(Some(TreeNode::Header(header)))
    }

    fn array_header(
        &self,
        key: &str,
        prop: &SchemaNode,
        xpath: String,
        data_xpath: Option<String>,
        required: bool,
    ) -> Option<HeaderNode> {
        let stored = self.stored_at(&xpath).filter(|v| v.is_array());
        let live = self.live_at(data_xpath.as_deref()).filter(|v| v.is_array());
        if !self.is_visible(prop, stored, live) {
            return None;
        }
        let mut header =
            self.header(key, prop.display_title(key), DataType::Array, xpath, data_xpath);
        header.required = required;
        header.state = compare_nodes(stored, live);
        header.affordances.add = self.edit()
            && live.is_some()
            && !prop.is_server_populate()
            && !(prop.is_orm_no_update() && stored.is_some());
        Some(header)
    }

    /// An array of documents.
    ///
    /// Stored elements come first, in stored order, each translated to its
    /// live position (or shown as removed). Live elements not matched by
    /// that pass are the newly added ones.
    fn array_node(
        &self,
        key: &str,
        prop: &SchemaNode,
        xpath: String,
        data_xpath: Option<String>,
        required: bool,
    ) -> Result<Option<TreeNode>> {
        let Some(mut header) = self.array_header(key, prop, xpath, data_xpath, required) else {
            return Ok(None);
        };
        let element = self.schema.element_schema(prop, &header.xpath)?;
        let stored_len = self
            .stored_at(&header.xpath)
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let mut visited = HashSet::new();
        for idx in 0..stored_len {
            let item_xpath = join_index(&header.xpath, idx);
            visited.insert(item_xpath.clone());
            if !self.in_focus(&item_xpath) {
                continue;
            }
            let item_data = get_data_xpath(self.ctx.live, &item_xpath);
            header.children.push(self.element_node(key, &element, item_xpath, item_data)?);
        }
        let live_items = self
            .live_at(header.data_xpath.as_deref())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for (idx, item) in live_items.iter().enumerate() {
            let Some(item_xpath) = element_xpath(item) else {
                tracing::trace!(array = %header.xpath, idx, "skipping unannotated element");
                continue;
            };
            if visited.contains(&item_xpath) || !self.in_focus(&item_xpath) {
                continue;
            }
            let item_data = header.data_xpath.as_deref().map(|d| join_index(d, idx));
            header.children.push(self.element_node(key, &element, item_xpath, item_data)?);
        }
        Ok(Some(TreeNode::Header(header)))
    }

    fn element_node(
        &self,
        key: &str,
        element: &SchemaNode,
        xpath: String,
        data_xpath: Option<String>,
    ) -> Result<TreeNode> {
        let stored = self.stored_at(&xpath);
        let live = self.live_at(data_xpath.as_deref());
        let title = format!("{} {}", element.display_title(key), element_label(&xpath));
        let mut header = self.header(key, title, DataType::Object, xpath, data_xpath);
        header.is_array_item = true;
        header.state = compare_nodes(stored, live);
        if self.edit() && live.is_some() {
            header.affordances.remove = true;
            header.affordances.duplicate = true;
        }
        header.children = self.properties(element, &header.xpath, header.data_xpath.as_deref())?;
        Ok(TreeNode::Header(header))
    }

    /// An array of primitives.
    ///
    /// Primitive elements carry no side-channels, so stored and live
    /// elements pair up by position. Each element is a leaf under its own
    /// header. When the live array is empty a `[-1]` placeholder header
    /// follows any removed stored elements.
    fn primitive_array_node(
        &self,
        key: &str,
        prop: &SchemaNode,
        xpath: String,
        data_xpath: Option<String>,
        required: bool,
        parent_live: Option<&Value>,
    ) -> Result<Option<TreeNode>> {
        let Some(mut header) = self.array_header(key, prop, xpath, data_xpath, required) else {
            return Ok(None);
        };
        let item = self.schema.primitive_item_schema(prop)?;
        let stored_len = self
            .stored_at(&header.xpath)
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let live_len = self
            .live_at(header.data_xpath.as_deref())
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        for idx in 0..stored_len.max(live_len) {
            let item_xpath = join_index(&header.xpath, idx);
            if !self.in_focus(&item_xpath) {
                continue;
            }
            let item_data = header
                .data_xpath
                .as_deref()
                .filter(|_| idx < live_len)
                .map(|d| join_index(d, idx));
            let leaf = self.leaf(
                key,
                &item,
                item_xpath.clone(),
                item_data.clone(),
                required,
                parent_live,
            )?;
            let Some(leaf) = leaf else {
                continue;
            };
            let title = format!("{} {}", item.display_title(key), element_label(&item_xpath));
            let mut wrapper = self.header(key, title, DataType::Array, item_xpath, item_data);
            wrapper.is_array_item = true;
            wrapper.state = leaf.state;
            if self.edit() && leaf.state != ModificationState::Removed {
                wrapper.affordances.remove = true;
                wrapper.affordances.duplicate = true;
            }
            wrapper.children.push(TreeNode::Leaf(leaf));
            header.children.push(TreeNode::Header(wrapper));
        }
        if live_len == 0 {
            let slot_xpath = join_placeholder(&header.xpath);
            let slot_data = header.data_xpath.as_deref().map(join_placeholder);
            let title = item.display_title(key);
            let mut slot = self.header(key, title, DataType::Array, slot_xpath, slot_data);
            slot.is_array_item = true;
            slot.placeholder = true;
            slot.affordances.add = header.affordances.add;
            header.children.push(TreeNode::Header(slot));
        }
        Ok(Some(TreeNode::Header(header)))
    }
}

/// `[n]` suffix of an element xpath, used in element titles.
fn element_label(xpath: &str) -> &str {
    xpath.rfind('[').map_or("", |pos| &xpath[pos..])
}

/// A `min`/`max` bound: a number, or the name of a sibling field holding one.
fn resolve_bound(bound: Option<&Value>, parent_live: Option<&Value>) -> Option<f64> {
    match bound? {
        Value::Number(n) => n.as_f64(),
        Value::String(sibling) => parent_live?.get(sibling)?.as_f64(),
        _ => None,
    }
}
