use formtree_xpath::{
    element_xpath, format_xpath, get, is_prefix, normalize_xpath, parse_xpath, Path, PathStep,
};
use serde_json::Value;

/// Check if `xpath` survives focusing the tree on `focus`.
///
/// Ancestors of the focused element, the element itself and unrelated
/// fields are kept. Other elements of the focused array are pruned. Below
/// the focus, array elements are kept only if `subtree` (the focused
/// element's row snapshot) holds an element recorded under the same xpath.
///
/// ```
/// use formtree::tree::is_node_in_subtree;
///
/// assert!(is_node_in_subtree("foo[2]", None, "foo"));
/// assert!(is_node_in_subtree("foo[2]", None, "foo[2].name"));
/// assert!(is_node_in_subtree("foo[2]", None, "other"));
/// assert!(!is_node_in_subtree("foo[2]", None, "foo[1].name"));
/// ```
pub fn is_node_in_subtree(focus: &str, subtree: Option<&Value>, xpath: &str) -> bool {
    if is_prefix(xpath, focus) {
        return true;
    }
    if !is_prefix(focus, xpath) {
        let (focus_norm, xpath_norm) = (normalize_xpath(focus), normalize_xpath(xpath));
        return !(is_prefix(&focus_norm, &xpath_norm) || is_prefix(&xpath_norm, &focus_norm));
    }
    let Some(subtree) = subtree else {
        return true;
    };
    let (Ok(focus_path), Ok(path)) = (parse_xpath(focus), parse_xpath(xpath)) else {
        return false;
    };
    let mut absolute: Path = focus_path.clone();
    let mut relative: Path = Vec::new();
    for step in path.into_iter().skip(focus_path.len()) {
        absolute.push(step.clone());
        let PathStep::Index(_) = step else {
            relative.push(step);
            continue;
        };
        let Some(items) = get(subtree, &relative).and_then(Value::as_array) else {
            return true;
        };
        if !items.iter().any(Value::is_object) {
            relative.push(step);
            continue;
        }
        let target = format_xpath(&absolute);
        match items
            .iter()
            .position(|item| element_xpath(item).as_deref() == Some(target.as_str()))
        {
            Some(position) => relative.push(PathStep::Index(position)),
            None => return false,
        }
    }
    true
}
