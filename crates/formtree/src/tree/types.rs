use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::helpers::ColorType;
use crate::schema::DataType;

/// How a node's live value relates to its stored value.
///
/// One value per node, so a node is never both added and modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModificationState {
    #[default]
    #[serde(rename = "unmodified")]
    Unmodified,
    #[serde(rename = "data-modified")]
    Modified,
    #[serde(rename = "data-add")]
    Added,
    #[serde(rename = "data-remove")]
    Removed,
}

impl ModificationState {
    pub fn is_modified(self) -> bool {
        self != ModificationState::Unmodified
    }
}

/// Structural edits a header offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordances {
    /// Create the (optional) object, or append an element to the array.
    pub add: bool,
    /// Null the object, or remove this array element.
    pub remove: bool,
    pub duplicate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderNode {
    pub id: String,
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: DataType,
    pub xpath: String,
    /// Position in the live document; `None` when the node is not live.
    #[serde(rename = "dataxpath")]
    pub data_xpath: Option<String>,
    pub is_open: bool,
    pub required: bool,
    pub state: ModificationState,
    pub affordances: Affordances,
    /// The header wraps one element of an array.
    pub is_array_item: bool,
    /// The `[-1]` slot of an empty array.
    pub placeholder: bool,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafNode {
    pub id: String,
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlying_type: Option<DataType>,
    pub xpath: String,
    #[serde(rename = "dataxpath")]
    pub data_xpath: Option<String>,
    /// Live value, or the stored value for a removed node.
    pub value: Value,
    pub required: bool,
    pub disabled: bool,
    pub state: ModificationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_bar: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Header(HeaderNode),
    Leaf(LeafNode),
}

impl TreeNode {
    pub fn key(&self) -> &str {
        match self {
            TreeNode::Header(header) => &header.key,
            TreeNode::Leaf(leaf) => &leaf.key,
        }
    }

    pub fn xpath(&self) -> &str {
        match self {
            TreeNode::Header(header) => &header.xpath,
            TreeNode::Leaf(leaf) => &leaf.xpath,
        }
    }

    pub fn data_xpath(&self) -> Option<&str> {
        match self {
            TreeNode::Header(header) => header.data_xpath.as_deref(),
            TreeNode::Leaf(leaf) => leaf.data_xpath.as_deref(),
        }
    }

    pub fn state(&self) -> ModificationState {
        match self {
            TreeNode::Header(header) => header.state,
            TreeNode::Leaf(leaf) => leaf.state,
        }
    }

    pub fn as_header(&self) -> Option<&HeaderNode> {
        match self {
            TreeNode::Header(header) => Some(header),
            TreeNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            TreeNode::Leaf(leaf) => Some(leaf),
            TreeNode::Header(_) => None,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Header(header) => &header.children,
            TreeNode::Leaf(_) => &[],
        }
    }

    /// Depth-first search by schema xpath.
    pub fn find(&self, xpath: &str) -> Option<&TreeNode> {
        if self.xpath() == xpath {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(xpath))
    }

    /// Visit every node depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a TreeNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}
