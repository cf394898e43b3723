//! Field constraints checked while editing.

use formtree_util::is_blank;
use thiserror::Error;

use crate::constants::UNSPECIFIED_SUFFIX;
use crate::schema::DataType;
use crate::tree::LeafNode;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstraintViolation {
    #[error("{0} is required")]
    Required(String),
    #[error("{0} must be specified")]
    Unspecified(String),
    #[error("{title} must be at least {min}")]
    BelowMin { title: String, min: f64 },
    #[error("{title} must be at most {max}")]
    AboveMax { title: String, max: f64 },
}

/// First constraint the leaf's current value breaks.
///
/// Checked in order: required, unspecified enum, lower bound, upper bound.
/// Bounds apply to numeric values only.
pub fn validate_constraints(leaf: &LeafNode) -> Result<(), ConstraintViolation> {
    if leaf.required && is_blank(Some(&leaf.value)) {
        return Err(ConstraintViolation::Required(leaf.title.clone()));
    }
    if leaf.required && leaf.kind == DataType::Enum {
        if let Some(value) = leaf.value.as_str().filter(|v| v.ends_with(UNSPECIFIED_SUFFIX)) {
            tracing::trace!(xpath = %leaf.xpath, value, "unspecified enum value");
            return Err(ConstraintViolation::Unspecified(leaf.title.clone()));
        }
    }
    let Some(number) = leaf.value.as_f64() else {
        return Ok(());
    };
    if let Some(min) = leaf.min.filter(|min| number < *min) {
        return Err(ConstraintViolation::BelowMin {
            title: leaf.title.clone(),
            min,
        });
    }
    if let Some(max) = leaf.max.filter(|max| number > *max) {
        return Err(ConstraintViolation::AboveMax {
            title: leaf.title.clone(),
            max,
        });
    }
    Ok(())
}
