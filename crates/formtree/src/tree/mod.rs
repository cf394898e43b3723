//! The editable node tree.
//!
//! Headers stand for objects, arrays and array elements; leaves for
//! primitive fields. Every node carries its schema xpath, its live data
//! xpath (if it is live), and its modification state against the stored
//! snapshot.

mod builder;
mod subtree;
mod types;

pub use builder::{generate_tree_structure, TreeContext};
pub use subtree::is_node_in_subtree;
pub use types::{Affordances, HeaderNode, LeafNode, ModificationState, TreeNode};
