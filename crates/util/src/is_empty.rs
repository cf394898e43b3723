use serde_json::Value;

/// Check if a value counts as "not set" for display purposes.
///
/// Missing, `null` and the empty string are blank. `0`, `false` and empty
/// containers are real values.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use formtree_util::is_empty::is_blank;
///
/// assert!(is_blank(None));
/// assert!(is_blank(Some(&json!(null))));
/// assert!(is_blank(Some(&json!(""))));
/// assert!(!is_blank(Some(&json!(0))));
/// assert!(!is_blank(Some(&json!(false))));
/// ```
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!(null))));
        assert!(is_blank(Some(&json!(""))));
        assert!(!is_blank(Some(&json!(" "))));
        assert!(!is_blank(Some(&json!([]))));
        assert!(!is_blank(Some(&json!({}))));
    }
}
