//! Project schema model.
//!
//! A project schema is a JSON object of model name to schema node, plus a
//! `definitions` map for `$ref` targets and an `autocomplete` map of named
//! option sets.

mod defaults;
mod types;

pub use defaults::{fill_required_objects, generate_object_from_schema};
pub use types::{DataType, ProjectSchema, SchemaNode};
