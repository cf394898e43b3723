//! User edits of leaf values.
//!
//! A renderer reports an edit as a [`ChangeEvent`] together with the leaf's
//! data xpath and schema xpath. [`apply_change`] produces the new live
//! document and the change record keyed by schema xpath.

use formtree_xpath::{get, parse_xpath, set, PathStep};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::Result;
use crate::schema::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ChangeEvent {
    Text(String),
    Select(String),
    Checkbox(bool),
    Autocomplete(Option<String>),
    DateTime(String),
}

impl ChangeEvent {
    /// The value to store for a field of type `kind`.
    ///
    /// Empty text clears the field. Text for a numeric field is parsed;
    /// unparseable input is kept as typed so the user can correct it.
    pub fn into_value(self, kind: DataType) -> Value {
        match self {
            ChangeEvent::Text(text) | ChangeEvent::DateTime(text) if text.trim().is_empty() => {
                Value::Null
            }
            ChangeEvent::Text(text) if kind.is_numeric() => {
                parse_number(&text, kind).unwrap_or_else(|| {
                    tracing::debug!(text = %text, "keeping unparseable numeric input");
                    Value::String(text)
                })
            }
            ChangeEvent::Text(text) | ChangeEvent::Select(text) | ChangeEvent::DateTime(text) => {
                Value::String(text)
            }
            ChangeEvent::Checkbox(checked) => Value::Bool(checked),
            ChangeEvent::Autocomplete(choice) => choice.map_or(Value::Null, Value::String),
        }
    }
}

fn parse_number(text: &str, kind: DataType) -> Option<Value> {
    let text = text.trim();
    if kind == DataType::Integer {
        if let Ok(n) = text.parse::<i64>() {
            return Some(Value::from(n));
        }
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// One edit, addressed by schema xpath.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserChange {
    pub xpath: String,
    pub value: Value,
}

/// Apply an edit to a copy of the live document.
///
/// A trailing `[-1]` in `data_xpath` (the placeholder slot of an empty
/// primitive array) appends to that array.
///
/// # Example
///
/// ```
/// use formtree::{apply_change, ChangeEvent, DataType};
/// use serde_json::json;
///
/// let live = json!({"legs": [{"qty": 1}]});
/// let event = ChangeEvent::Text("25".into());
/// let (next, change) =
///     apply_change(&live, event, "legs[0].qty", "legs[3].qty", DataType::Integer).unwrap();
/// assert_eq!(next, json!({"legs": [{"qty": 25}]}));
/// assert_eq!(change.xpath, "legs[3].qty");
/// assert_eq!(live, json!({"legs": [{"qty": 1}]}));
/// ```
pub fn apply_change(
    live: &Value,
    event: ChangeEvent,
    data_xpath: &str,
    xpath: &str,
    kind: DataType,
) -> Result<(Value, UserChange)> {
    let value = event.into_value(kind);
    let mut path = parse_xpath(data_xpath)?;
    let mut next = live.clone();
    if let Some(PathStep::Placeholder) = path.last() {
        let parent = &path[..path.len() - 1];
        let len = get(&next, parent).and_then(Value::as_array).map_or(0, Vec::len);
        path.pop();
        path.push(PathStep::Index(len));
    }
    set(&mut next, &path, value.clone())?;
    tracing::trace!(data_xpath, xpath, "applied change");
    Ok((
        next,
        UserChange {
            xpath: xpath.to_string(),
            value,
        },
    ))
}
