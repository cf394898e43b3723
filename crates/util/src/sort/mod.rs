//! Sorting utilities.
//!
//! Stable insertion sorts. Schema property lists are short and usually
//! already in order, and ties must keep declaration order.

mod insertion;

pub use insertion::insertion_sort_by;
