//! Value-to-colour rules declared by `color`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorType {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
    Success,
}

impl ColorType {
    pub fn from_level(level: &str) -> Option<Self> {
        match level.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(ColorType::Critical),
            "error" => Some(ColorType::Error),
            "warning" => Some(ColorType::Warning),
            "info" => Some(ColorType::Info),
            "debug" => Some(ColorType::Debug),
            "success" => Some(ColorType::Success),
            _ => None,
        }
    }
}

/// Parse `VALUE=level` rules separated by `,`. Unknown levels are dropped.
///
/// ```
/// use formtree::helpers::{parse_color_rules, ColorType};
///
/// let rules = parse_color_rules("FILLED=success,REJECTED=error,ODD=purple");
/// assert_eq!(rules.get("FILLED"), Some(&ColorType::Success));
/// assert_eq!(rules.len(), 2);
/// ```
pub fn parse_color_rules(declaration: &str) -> IndexMap<String, ColorType> {
    let mut rules = IndexMap::new();
    for entry in declaration.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry
            .split_once('=')
            .and_then(|(value, level)| Some((value.trim(), ColorType::from_level(level)?)))
        {
            Some((value, color)) if !value.is_empty() => {
                rules.insert(value.to_string(), color);
            }
            _ => tracing::debug!(entry, "dropping malformed color rule"),
        }
    }
    rules
}

/// The colour a value takes under a `color` declaration.
///
/// Non-string values match by their JSON text, so `1=error` applies to `1`.
pub fn color_for_value(declaration: &str, value: Option<&Value>) -> Option<ColorType> {
    let key = match value? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    parse_color_rules(declaration).get(&key).copied()
}
