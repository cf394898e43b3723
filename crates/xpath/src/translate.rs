//! Schema xpath to data xpath translation.

use serde_json::Value;

use crate::side_channel::element_xpath;
use crate::{format_xpath, get, parse_xpath, Path, PathStep};

/// Translate a schema xpath into the live document.
///
/// Walks `xpath` step by step. At every array index the live array at the
/// translated prefix is scanned for the element whose recorded schema xpath
/// equals the original prefix, and that element's live position is used
/// instead. Returns `None` when no live element corresponds, i.e. the node
/// was removed or never created.
///
/// Xpaths containing the `[-1]` sentinel, and xpaths rooted at a bare `[`
/// (root-level repeated arrays), are returned unchanged.
///
/// The live document is only read.
///
/// # Example
///
/// ```
/// use formtree_xpath::get_data_xpath;
/// use serde_json::json;
///
/// let live = json!({"foo": [
///     {"name": "new", "xpath_name": "foo[2].name"},
///     {"name": "old", "xpath_name": "foo[0].name"},
/// ]});
/// assert_eq!(get_data_xpath(&live, "foo[0].name").as_deref(), Some("foo[1].name"));
/// assert_eq!(get_data_xpath(&live, "foo[2]").as_deref(), Some("foo[0]"));
/// assert_eq!(get_data_xpath(&live, "foo[1]"), None);
/// assert_eq!(get_data_xpath(&live, "foo[-1]").as_deref(), Some("foo[-1]"));
/// ```
pub fn get_data_xpath(live: &Value, xpath: &str) -> Option<String> {
    if xpath.starts_with('[') || xpath.contains("[-1]") {
        return Some(xpath.to_string());
    }
    let path = match parse_xpath(xpath) {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(xpath, %err, "cannot translate malformed xpath");
            return None;
        }
    };
    let mut original: Path = Vec::with_capacity(path.len());
    let mut translated: Path = Vec::with_capacity(path.len());
    for step in path {
        match step {
            PathStep::Index(idx) => {
                original.push(PathStep::Index(idx));
                let target = format_xpath(&original);
                let items = get(live, &translated)?.as_array()?;
                let Some(position) = items
                    .iter()
                    .position(|item| element_xpath(item).as_deref() == Some(target.as_str()))
                else {
                    tracing::trace!(xpath, target = %target, "no live element for schema xpath");
                    return None;
                };
                translated.push(PathStep::Index(position));
            }
            other => {
                original.push(other.clone());
                translated.push(other);
            }
        }
    }
    Some(format_xpath(&translated))
}
