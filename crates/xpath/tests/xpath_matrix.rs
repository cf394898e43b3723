use formtree_xpath::{
    format_xpath, get_by_xpath, is_prefix, join_index, join_key, join_placeholder,
    last_index, normalize_xpath, parse_xpath, set_by_xpath, PathStep,
    XPathError,
};
use serde_json::json;

#[test]
fn xpath_parse_format_roundtrip_matrix() {
    let cases = [
        "",
        "foo",
        "foo.bar",
        "foo[0]",
        "foo[12].bar",
        "foo[0].bar[3].baz",
        "[0]",
        "[4].name",
        "grid[1][2]",
        "tags[-1]",
    ];

    for xpath in cases {
        let path = parse_xpath(xpath).expect("parse ok");
        assert_eq!(format_xpath(&path), xpath);
    }
}

#[test]
fn xpath_join_matrix() {
    assert_eq!(join_key("", "a"), "a");
    assert_eq!(join_key("a[0]", "b"), "a[0].b");
    assert_eq!(join_index("", 2), "[2]");
    assert_eq!(join_index("a", 2), "a[2]");
    assert_eq!(join_placeholder("a.b"), "a.b[-1]");
}

#[test]
fn xpath_get_and_set_matrix() {
    let mut doc = json!({"order": {"legs": [{"px": 1.5}, {"px": 2.5}]}});

    assert_eq!(get_by_xpath(&doc, "order.legs[1].px"), Some(&json!(2.5)));
    assert_eq!(get_by_xpath(&doc, "order.legs[2].px"), None);
    assert_eq!(get_by_xpath(&doc, "order.legs[-1]"), None);
    assert_eq!(get_by_xpath(&doc, "order..legs"), None);

    set_by_xpath(&mut doc, "order.legs[2]", json!({"px": 3.0})).expect("append ok");
    assert_eq!(get_by_xpath(&doc, "order.legs[2].px"), Some(&json!(3.0)));

    set_by_xpath(&mut doc, "order.legs[0].px", json!(9)).expect("replace ok");
    assert_eq!(doc["order"]["legs"][0]["px"], json!(9));
}

#[test]
fn xpath_errors_matrix() {
    assert!(matches!(parse_xpath("a[b]"), Err(XPathError::InvalidXPath(_))));
    assert!(matches!(parse_xpath("a[-7]"), Err(XPathError::InvalidIndex(_))));

    let mut doc = json!({"a": "scalar"});
    assert!(matches!(
        set_by_xpath(&mut doc, "a.b", json!(1)),
        Err(XPathError::NotFound(_))
    ));
    let mut doc = json!({"a": {}});
    assert!(matches!(
        set_by_xpath(&mut doc, "a[0]", json!(1)),
        Err(XPathError::NotAnArray(_))
    ));
}

#[test]
fn xpath_relations_matrix() {
    assert_eq!(normalize_xpath("a[5].b[2]"), "a[0].b[0]");
    assert_eq!(last_index("a[5].b[2]"), Some(2));
    assert_eq!(last_index("a[5].b"), None);
    assert!(is_prefix("a[5]", "a[5].b"));
    assert!(!is_prefix("a[5]", "a[50].b"));
    assert!(!is_prefix("a.b", "a"));
}

#[test]
fn xpath_placeholder_step_parses() {
    let path = parse_xpath("tags[-1]").expect("placeholder ok");
    assert_eq!(path, vec![PathStep::Key("tags".into()), PathStep::Placeholder]);
}
