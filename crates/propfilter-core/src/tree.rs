//! Tree pruning: filter an already-materialized document.
//!
//! Objects keep only the properties whose names are in the [`NameSet`], in
//! their original order. Retained values are pruned again by the same rule;
//! rejected values are dropped whole and never inspected. Arrays keep their
//! length and order, and scalars pass through untouched.

use serde_json::Value;
use tracing::debug;

use crate::names::NameSet;

/// Prune `value` and return it.
///
/// # Examples
///
/// ```
/// use propfilter_core::{tree, NameSet};
/// use serde_json::json;
///
/// let names = NameSet::new(["a"]);
/// let pruned = tree::filter(json!({"a": 1, "b": {"a": 2}}), &names);
/// assert_eq!(pruned, json!({"a": 1}));
/// ```
pub fn filter(mut value: Value, names: &NameSet) -> Value {
    filter_in_place(&mut value, names);
    value
}

/// Prune `value` in place.
///
/// Uses an explicit work list, so document depth is not bounded by the call
/// stack.
pub fn filter_in_place(value: &mut Value, names: &NameSet) {
    let mut removed = 0usize;
    let mut pending: Vec<&mut Value> = vec![value];

    while let Some(current) = pending.pop() {
        match current {
            Value::Object(map) => {
                let before = map.len();
                map.retain(|name, _| names.contains(name));
                removed += before - map.len();
                pending.extend(map.values_mut());
            }
            Value::Array(items) => pending.extend(items.iter_mut()),
            _ => {}
        }
    }

    debug!(removed, "pruned document tree");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(list: &[&str]) -> NameSet {
        NameSet::new(list.iter().copied())
    }

    #[test]
    fn scalars_pass_through() {
        let set = names(&[]);
        assert_eq!(filter(json!(42), &set), json!(42));
        assert_eq!(filter(json!("text"), &set), json!("text"));
        assert_eq!(filter(json!(null), &set), json!(null));
        assert_eq!(filter(json!([1, true, "x"]), &set), json!([1, true, "x"]));
    }

    #[test]
    fn rejected_branch_is_not_searched() {
        let pruned = filter(json!({"a": 1, "b": {"a": 2}}), &names(&["a"]));
        assert_eq!(pruned, json!({"a": 1}));
    }

    #[test]
    fn array_of_objects() {
        let value = json!({"items": [{"id": 1, "x": 2}, {"id": 3}]});
        let pruned = filter(value, &names(&["items", "id"]));
        assert_eq!(pruned, json!({"items": [{"id": 1}, {"id": 3}]}));
    }

    #[test]
    fn retained_objects_are_filtered_again() {
        let value = json!({"user": {"id": 7, "password": "hunter2", "name": "ann"}});
        let pruned = filter(value, &names(&["user", "id", "name"]));
        assert_eq!(pruned, json!({"user": {"id": 7, "name": "ann"}}));
    }

    #[test]
    fn empty_whitelist_leaves_empty_objects() {
        let value = json!([{"a": 1}, [{"b": {"c": 2}}], 3]);
        assert_eq!(filter(value, &names(&[])), json!([{}, [{}], 3]));
    }

    #[test]
    fn full_whitelist_is_identity() {
        let value = json!({"z": 1, "a": {"m": [1, {"z": 2}]}, "m": null});
        assert_eq!(filter(value.clone(), &names(&["z", "a", "m"])), value);
    }

    #[test]
    fn key_order_preserved() {
        let value = json!({"c": 1, "drop": 0, "a": 2, "b": 3});
        let pruned = filter(value, &names(&["a", "b", "c"]));
        let keys: Vec<&String> = pruned.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["c", "a", "b"]);
    }

    #[test]
    fn mixed_array_elements() {
        let value = json!({"list": [1, {"k": 1, "v": 2}, [{"v": 3}], "s"]});
        let pruned = filter(value, &names(&["list", "k"]));
        assert_eq!(pruned, json!({"list": [1, {"k": 1}, [{}], "s"]}));
    }

    fn on_stack<T: Send + 'static>(bytes: usize, f: impl FnOnce() -> T + Send + 'static) -> T {
        std::thread::Builder::new()
            .stack_size(bytes)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        const DEPTH: usize = 2_000;

        // Dropping a deep Value recurses, so the fixture lives on a large stack.
        on_stack(256 << 20, || {
            let mut value = json!({"keep": 1});
            for _ in 0..DEPTH {
                let mut map = serde_json::Map::new();
                map.insert("next".into(), value);
                map.insert("drop".into(), json!(0));
                value = Value::Object(map);
            }

            let set = names(&["next", "keep"]);
            let value = on_stack(256 << 10, move || {
                filter_in_place(&mut value, &set);
                value
            });

            let mut cursor = &value;
            let mut depth = 0;
            while let Some(next) = cursor.get("next") {
                assert!(cursor.get("drop").is_none());
                cursor = next;
                depth += 1;
            }
            assert_eq!(depth, DEPTH);
            assert_eq!(cursor, &json!({"keep": 1}));
        });
    }

    #[test]
    fn idempotent() {
        let set = names(&["a", "b"]);
        let once = filter(json!({"a": {"b": 1, "c": 2}, "c": [{"a": 1}]}), &set);
        assert_eq!(filter(once.clone(), &set), once);
    }
}
