//! String helpers for turning schema keys into display text.

mod title;

pub use title::title_case;
