use std::collections::HashSet;

use formtree_xpath::{add_xpath, clear_xpath, get_data_xpath, last_index};
use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_json::{json, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z ]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            // keys never start with 'x', so no data key collides with a side-channel
            prop::collection::btree_map("[a-w][a-z_]{0,5}", inner, 0..5)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn shuffled_indices() -> impl Strategy<Value = Vec<usize>> {
    (1usize..12).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn clearxpath_undoes_addxpath(doc in arb_json()) {
        let mut annotated = doc.clone();
        add_xpath(&mut annotated, "");
        clear_xpath(&mut annotated);
        prop_assert_eq!(annotated, doc);
    }

    #[test]
    fn translation_is_a_permutation(order in shuffled_indices()) {
        let n = order.len();
        let items: Vec<Value> = (0..n).map(|i| json!({"name": format!("n{i}")})).collect();
        let mut stored = json!({"items": items});
        add_xpath(&mut stored, "");

        let stored_items = stored["items"].as_array().cloned().unwrap_or_default();
        let live_items: Vec<Value> = order.iter().map(|&i| stored_items[i].clone()).collect();
        let live = json!({"items": live_items});

        let mut seen = HashSet::new();
        for i in 0..n {
            let data_xpath = get_data_xpath(&live, &format!("items[{i}]"));
            prop_assert!(data_xpath.is_some());
            let live_idx = data_xpath.as_deref().and_then(last_index);
            prop_assert!(live_idx.is_some_and(|idx| idx < n));
            prop_assert!(seen.insert(live_idx));
            prop_assert_eq!(&live["items"][live_idx.unwrap_or(n)]["name"], &json!(format!("n{i}")));
        }
    }
}
