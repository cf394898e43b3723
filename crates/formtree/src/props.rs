//! Caller-supplied render configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Edit,
    #[default]
    Read,
    Disabled,
}

/// How a caller wants a model rendered.
///
/// Deserialises from the camelCase JSON a rendering layer hands over;
/// missing keys take their defaults (read mode, nothing hidden, no focus).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallerProps {
    pub mode: Mode,
    /// Honour `hide` declarations in the schema.
    pub hide: bool,
    /// Focus xpath: render only this element of a repeated structure.
    pub xpath: Option<String>,
    /// Snapshot of the focused element, as produced by the row builder.
    pub subtree: Option<Value>,
    /// Default expansion for headers with no recorded state.
    pub is_open: bool,
}

impl CallerProps {
    pub fn edit() -> Self {
        Self {
            mode: Mode::Edit,
            ..Self::default()
        }
    }

    pub fn read() -> Self {
        Self::default()
    }

    pub fn with_hide(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }

    pub fn with_focus(mut self, xpath: impl Into<String>, subtree: Option<Value>) -> Self {
        self.xpath = Some(xpath.into());
        self.subtree = subtree;
        self
    }

    pub fn is_edit(&self) -> bool {
        self.mode == Mode::Edit
    }
}
