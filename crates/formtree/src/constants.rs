//! Names and markers shared across the builders.

/// Document identifier field of stored records.
pub const DB_ID: &str = "_id";

/// Synthetic row key carrying the row's identity.
pub const DATA_ID: &str = "data-id";

/// `abbreviated` value marking a sub-structure as one opaque value.
pub const JSON_ABBREVIATION: &str = "JSON";

/// Enum values ending with this suffix mean "not chosen yet".
pub const UNSPECIFIED_SUFFIX: &str = "_UNSPECIFIED";

/// Autocomplete key that binds every field of the declaring container.
pub const AUTOCOMPLETE_WILDCARD: &str = "*";
