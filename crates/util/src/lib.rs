//! formtree-util - JSON leaf helpers shared by the formtree crates.
//!
//! Nothing in here knows about schemas or xpaths; these are the small
//! value-level predicates and orderings the builders lean on.

pub mod is_empty;
pub mod json_equal;
pub mod sort;
pub mod strings;

pub use is_empty::is_blank;
pub use json_equal::{deep_equal, deep_equal_by_key};
pub use sort::insertion_sort_by;
pub use strings::title_case;
