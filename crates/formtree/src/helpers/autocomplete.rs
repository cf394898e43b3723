//! `auto_complete` declarations.
//!
//! A declaration is a `,`-separated list of bindings:
//!
//! - `field:OptionSet` binds `field` to the named option set
//! - `field=OtherField` binds `field` to the option set named by the current
//!   value of the sibling `OtherField`
//!
//! The field name `*` binds every field of the declaring container.

use indexmap::IndexMap;
use serde_json::Value;

use crate::constants::AUTOCOMPLETE_WILDCARD;
use crate::schema::ProjectSchema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutocompleteBinding {
    /// Name of an option set.
    Static(String),
    /// Name of a sibling field whose value names the option set.
    Dynamic(String),
}

pub type AutocompleteDict = IndexMap<String, AutocompleteBinding>;

/// Parse an `auto_complete` declaration.
///
/// Entries that match neither form are dropped.
///
/// # Example
///
/// ```
/// use formtree::helpers::{parse_autocomplete, AutocompleteBinding};
///
/// let dict = parse_autocomplete("symbol:Symbols, venue=exchange, junk");
/// assert_eq!(dict["symbol"], AutocompleteBinding::Static("Symbols".into()));
/// assert_eq!(dict["venue"], AutocompleteBinding::Dynamic("exchange".into()));
/// assert_eq!(dict.len(), 2);
/// ```
pub fn parse_autocomplete(declaration: &str) -> AutocompleteDict {
    let mut dict = IndexMap::new();
    for entry in declaration.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let parsed = if let Some((field, set)) = entry.split_once(':') {
            Some((field.trim(), AutocompleteBinding::Static(set.trim().to_string())))
        } else if let Some((field, sibling)) = entry.split_once('=') {
            Some((field.trim(), AutocompleteBinding::Dynamic(sibling.trim().to_string())))
        } else {
            None
        };
        match parsed {
            Some((field, binding)) if !field.is_empty() && !binding.target().is_empty() => {
                dict.insert(field.to_string(), binding);
            }
            _ => tracing::debug!(entry, "dropping malformed auto_complete entry"),
        }
    }
    dict
}

impl AutocompleteBinding {
    fn target(&self) -> &str {
        match self {
            AutocompleteBinding::Static(name) | AutocompleteBinding::Dynamic(name) => name,
        }
    }

    /// The option set name this binding selects, given the field's parent
    /// object in the live document.
    pub fn option_set<'a>(&'a self, parent: Option<&'a Value>) -> Option<&'a str> {
        match self {
            AutocompleteBinding::Static(name) => Some(name.as_str()),
            AutocompleteBinding::Dynamic(sibling) => parent?.get(sibling)?.as_str(),
        }
    }
}

/// The binding for `field`, falling back to the `*` wildcard.
pub fn binding_for<'a>(dict: &'a AutocompleteDict, field: &str) -> Option<&'a AutocompleteBinding> {
    dict.get(field).or_else(|| dict.get(AUTOCOMPLETE_WILDCARD))
}

/// Resolve the autocomplete options of `field`.
///
/// `None` when the declaration does not bind the field or names an option
/// set the project does not define.
pub fn resolve_options(
    schema: &ProjectSchema,
    declaration: &str,
    field: &str,
    parent: Option<&Value>,
) -> Option<Vec<String>> {
    let dict = parse_autocomplete(declaration);
    let set = binding_for(&dict, field)?.option_set(parent)?;
    match schema.autocomplete_options(set) {
        Some(options) => Some(options.to_vec()),
        None => {
            tracing::debug!(field, set, "autocomplete option set not defined");
            None
        }
    }
}
