//! Expansion and transient display state shared across tree generations.

use std::collections::BTreeMap;

use formtree_xpath::is_prefix;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-xpath display state that outlives a single tree generation.
///
/// Both maps are keyed by schema xpath and are last-write-wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    expanded: BTreeMap<String, bool>,
    transient: BTreeMap<String, Value>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded expansion of a header, if any.
    pub fn is_open(&self, xpath: &str) -> Option<bool> {
        self.expanded.get(xpath).copied()
    }

    pub fn set_open(&mut self, xpath: impl Into<String>, open: bool) {
        self.expanded.insert(xpath.into(), open);
    }

    /// Flip a header's expansion; an unrecorded header is taken as closed.
    pub fn toggle(&mut self, xpath: &str) -> bool {
        let open = !self.is_open(xpath).unwrap_or(false);
        self.set_open(xpath, open);
        open
    }

    pub fn expand(&mut self, xpath: impl Into<String>) {
        self.set_open(xpath, true);
    }

    pub fn set_transient(&mut self, xpath: impl Into<String>, value: Value) {
        self.transient.insert(xpath.into(), value);
    }

    pub fn transient(&self, xpath: &str) -> Option<&Value> {
        self.transient.get(xpath)
    }

    /// Drop all state at or under `prefix`.
    pub fn forget(&mut self, prefix: &str) {
        self.expanded.retain(|xpath, _| !is_prefix(prefix, xpath));
        self.transient.retain(|xpath, _| !is_prefix(prefix, xpath));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_forget_prunes_subtree_only() {
        let mut view = ViewState::new();
        view.expand("foo");
        view.expand("foo[1]");
        view.set_open("foo[1].bar", false);
        view.expand("foobar");
        view.set_transient("foo[1].bar.x", json!("dirty"));
        view.forget("foo[1]");
        assert_eq!(view.is_open("foo"), Some(true));
        assert_eq!(view.is_open("foo[1]"), None);
        assert_eq!(view.is_open("foo[1].bar"), None);
        assert_eq!(view.is_open("foobar"), Some(true));
        assert_eq!(view.transient("foo[1].bar.x"), None);
    }

    #[test]
    fn test_toggle_last_write_wins() {
        let mut view = ViewState::new();
        assert!(view.toggle("a"));
        assert!(!view.toggle("a"));
        view.set_open("a", true);
        assert_eq!(view.is_open("a"), Some(true));
    }
}
