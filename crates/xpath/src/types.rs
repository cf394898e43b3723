//! Type definitions for xpaths.

use std::fmt;

/// Index written as `[-1]`: an array slot that has no element yet.
pub const PLACEHOLDER_INDEX: i64 = -1;

/// A step in an xpath.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Object field, written `name` (joined to the previous step with `.`).
    Key(String),
    /// Array position, written `[n]`.
    Index(usize),
    /// The `[-1]` sentinel of an empty array.
    Placeholder,
}

impl PathStep {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathStep::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Index(idx) => Some(*idx),
            _ => None,
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, PathStep::Index(_) | PathStep::Placeholder)
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => f.write_str(key),
            PathStep::Index(idx) => write!(f, "[{idx}]"),
            PathStep::Placeholder => write!(f, "[{PLACEHOLDER_INDEX}]"),
        }
    }
}

/// A parsed xpath.
pub type Path = Vec<PathStep>;
