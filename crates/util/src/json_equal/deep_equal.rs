use serde_json::{Map, Value};

/// Performs a deep equality check between two JSON values.
///
/// Object key order is ignored; array order is not.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use formtree_util::json_equal::deep_equal;
///
/// let a = json!({"foo": [1, 2, 3], "bar": null});
/// let b = json!({"bar": null, "foo": [1, 2, 3]});
/// let c = json!({"foo": [1, 2, 4], "bar": null});
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    deep_equal_by_key(a, b, &|_: &str| true)
}

/// Deep equality that only looks at object keys accepted by `keep`.
///
/// Keys rejected by `keep` are ignored on both sides, at every depth. This is
/// how two data snapshots are compared while disregarding bookkeeping keys.
///
/// ```
/// use serde_json::json;
/// use formtree_util::json_equal::deep_equal_by_key;
///
/// let a = json!({"name": "a", "meta": 1});
/// let b = json!({"name": "a"});
/// assert!(deep_equal_by_key(&a, &b, &|k| k != "meta"));
/// ```
pub fn deep_equal_by_key(a: &Value, b: &Value, keep: &dyn Fn(&str) -> bool) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(arr_a), Value::Array(arr_b)) => {
            arr_a.len() == arr_b.len()
                && arr_a
                    .iter()
                    .zip(arr_b)
                    .all(|(x, y)| deep_equal_by_key(x, y, keep))
        }
        (Value::Object(obj_a), Value::Object(obj_b)) => maps_equal(obj_a, obj_b, keep),
        _ => false,
    }
}

fn maps_equal(a: &Map<String, Value>, b: &Map<String, Value>, keep: &dyn Fn(&str) -> bool) -> bool {
    let kept_a = a.keys().filter(|k| keep(k.as_str())).count();
    let kept_b = b.keys().filter(|k| keep(k.as_str())).count();
    if kept_a != kept_b {
        return false;
    }
    a.iter().filter(|(k, _)| keep(k.as_str())).all(|(key, val_a)| match b.get(key) {
        Some(val_b) => deep_equal_by_key(val_a, val_b, keep),
        None => false,
    })
}

// 5 and 5.0 describe the same field value once it has gone through a text input.
fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if a == b {
        return true;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
