//! formtree: schema-driven form trees, table rows and edit diffs.
//!
//! Given a project schema and two snapshots of a document (the stored one
//! and the live, user-edited one) this crate derives everything a generic
//! form/table renderer needs without per-model UI code:
//!
//! - [`collections`]: one display descriptor per schema field, built once
//!   per schema.
//! - [`tree`]: the editable node tree with add/remove/duplicate affordances
//!   and per-node modification state.
//! - [`rows`]: flattened table rows and the columns shared by every row.
//! - [`diff`] and [`mutation`]: stored-vs-live comparison and the structural
//!   edits that keep schema xpaths stable while the live copy changes.
//!
//! Everything here is synchronous and pure apart from the explicit `&mut`
//! arguments; see [`schedule`] for the caller-side coalescing contract.

pub mod collections;
pub mod constants;
pub mod diff;
pub mod error;
pub mod events;
pub mod helpers;
pub mod mutation;
pub mod props;
pub mod rows;
pub mod schedule;
pub mod schema;
pub mod tree;
pub mod validation;
pub mod view_state;

pub use collections::{create_collections, create_model_collections, Collection};
pub use diff::{compare_nodes, compare_objects};
pub use error::{FormTreeError, Result};
pub use events::{apply_change, ChangeEvent, UserChange};
pub use mutation::{
    add_array_item, duplicate_array_item, next_array_index, recreate_object, remove_array_item,
    remove_object,
};
pub use props::{CallerProps, Mode};
pub use rows::{
    generate_row_trees, generate_rows_from_tree, get_common_key_collections, get_table_columns,
    CommonKeyCollection, Row,
};
pub use schedule::Coalescer;
pub use schema::{generate_object_from_schema, DataType, ProjectSchema, SchemaNode};
pub use tree::{
    generate_tree_structure, HeaderNode, LeafNode, ModificationState, TreeContext, TreeNode,
};
pub use validation::{validate_constraints, ConstraintViolation};
pub use view_state::ViewState;
