//! Schema flattening helpers used by the collection, tree and row builders.
//!
//! The declaration strings parsed here are permissive: an
//! entry that does not fit its pattern is dropped, never an error.

pub mod abbreviated;
pub mod autocomplete;
pub mod color;
mod enums;
mod sequence;

pub use abbreviated::{abbreviated_key, parse_abbreviated};
pub use autocomplete::{parse_autocomplete, AutocompleteBinding, AutocompleteDict};
pub use color::{color_for_value, parse_color_rules, ColorType};
pub use enums::get_enum_values;
pub use sequence::sort_by_sequence;
