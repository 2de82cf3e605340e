//! # Schema Mapper
//!
//! Infers the set of distinct paths that describe the shape of a data
//! instance. The output uses the same syntax the query engine compiles, so
//! a mapped path can be fed straight back into [`Query::exec`](crate::Query::exec).
//!
//! ## Classification
//!
//! Containers are classified in this order:
//!
//! 1. **List of primitives** — every key is an integer key and no element
//!    is a container. Emits `<path>[]`. Empty containers and lists holding
//!    only nulls land here.
//! 2. **List of objects** — every key is an integer key, at least one
//!    element is a container, every other element is null. Each map
//!    element is mapped as a fresh root and the union of the results is
//!    emitted under `<path>[].`. An element that is itself list-like has no
//!    keys to descend into, so it emits `<path>[]`.
//! 3. **Anything else** — iterated key by key, joined with `.` (no
//!    separator at the root).
//!
//! Null elements of an object list carry no shape and are skipped.

use std::collections::BTreeSet;

use warden_core::Node;

/// Map a data instance to the set of paths describing its shape.
///
/// Pure: the data is only read.
pub fn map_paths(data: &Node) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    walk(data, "", true, &mut paths);
    paths
}

fn walk(node: &Node, here: &str, at_root: bool, out: &mut BTreeSet<String>) {
    match node {
        Node::Null | Node::Scalar(_) => {
            out.insert(here.to_string());
        }
        Node::List(_) | Node::Map(_) if is_list_of_primitives(node) => {
            out.insert(format!("{here}[]"));
        }
        Node::List(_) | Node::Map(_) if is_list_of_objects(node) => {
            let mut element_paths = BTreeSet::new();
            for (_, element) in node.entries() {
                if element.is_null() {
                    continue;
                }
                if element.has_integer_keys() {
                    out.insert(format!("{here}[]"));
                } else {
                    walk(element, "", true, &mut element_paths);
                }
            }
            for sub in element_paths {
                out.insert(format!("{here}[].{sub}"));
            }
        }
        Node::List(_) | Node::Map(_) => {
            for (key, child) in node.entries() {
                let child_path = if at_root {
                    key
                } else {
                    format!("{here}.{key}")
                };
                walk(child, &child_path, false, out);
            }
        }
    }
}

/// Returns true for containers whose keys are all integer keys and whose
/// elements are all non-containers.
pub fn is_list_of_primitives(node: &Node) -> bool {
    node.has_integer_keys() && node.entries().iter().all(|(_, child)| !child.is_container())
}

/// Returns true for containers whose keys are all integer keys, holding at
/// least one container, with every other element null.
pub fn is_list_of_objects(node: &Node) -> bool {
    if !node.has_integer_keys() {
        return false;
    }
    let entries = node.entries();
    let all_containers_or_null = entries
        .iter()
        .all(|(_, child)| child.is_container() || child.is_null());
    let any_container = entries.iter().any(|(_, child)| child.is_container());
    all_containers_or_null && any_container
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(value: serde_json::Value) -> Vec<String> {
        map_paths(&Node::from(value)).into_iter().collect()
    }

    #[test]
    fn scalar_root_maps_to_root_path() {
        assert_eq!(paths(json!("x")), vec![String::new()]);
        assert_eq!(paths(json!(null)), vec![String::new()]);
    }

    #[test]
    fn flat_map() {
        assert_eq!(paths(json!({"a": 1, "b": "x"})), vec!["a", "b"]);
    }

    #[test]
    fn nested_map_joins_with_dots() {
        assert_eq!(paths(json!({"a": {"b": {"c": true}}})), vec!["a.b.c"]);
    }

    #[test]
    fn list_of_primitives() {
        assert_eq!(paths(json!({"tags": ["x", "y"]})), vec!["tags[]"]);
    }

    #[test]
    fn empty_containers_map_as_primitive_lists() {
        assert_eq!(paths(json!({"a": [], "b": {}})), vec!["a[]", "b[]"]);
    }

    #[test]
    fn list_of_objects_merges_element_shapes() {
        let got = paths(json!({
            "magic": [
                {"type": "blood", "risk": "high"},
                {"type": "poison", "garbage": "bleh"}
            ]
        }));
        assert_eq!(
            got,
            vec!["magic[].garbage", "magic[].risk", "magic[].type"]
        );
    }

    #[test]
    fn null_elements_do_not_disqualify_object_lists() {
        let got = paths(json!({"items": [null, {"sku": "a"}, null]}));
        assert_eq!(got, vec!["items[].sku"]);
    }

    #[test]
    fn all_null_list_is_a_primitive_list() {
        assert_eq!(paths(json!({"nullThings": [null, null]})), vec!["nullThings[]"]);
    }

    #[test]
    fn list_of_lists_maps_as_flat_list() {
        assert_eq!(paths(json!({"a": [[1], [2]]})), vec!["a[]"]);
        assert_eq!(paths(json!({"a": [[{"b": 1}]]})), vec!["a[]"]);
        assert_eq!(paths(json!({"a": [null, [1]]})), vec!["a[]"]);
    }

    #[test]
    fn object_list_with_list_elements() {
        let got = paths(json!({"a": [{"b": 1}, [2]]}));
        assert_eq!(got, vec!["a[]", "a[].b"]);
    }

    #[test]
    fn list_elements_never_produce_empty_symbols() {
        for value in [
            json!({"a": [[1], [2]]}),
            json!({"a": [[{"b": 1}]]}),
            json!({"a": [{"b": 1}, [2]]}),
            json!({"a": [{}, {"0": {"b": 1}}]}),
        ] {
            for path in map_paths(&Node::from(value.clone())) {
                assert!(
                    warden_core::SchemaPath::compile(&path).is_ok(),
                    "{path} mapped from {value} did not compile"
                );
            }
        }
    }

    #[test]
    fn mixed_list_is_iterated_by_index() {
        let got = paths(json!({"mixed": [1, {"a": 2}]}));
        assert_eq!(got, vec!["mixed.0", "mixed.1.a"]);
    }

    #[test]
    fn integer_keyed_map_is_list_like() {
        let got = paths(json!({"a": {"0": "x", "2": "y"}}));
        assert_eq!(got, vec!["a[]"]);
    }

    #[test]
    fn mozart() {
        let got = map_paths(&Node::from(json!({
            "name": "Mozart's 9th",
            "measures": [
                {"notes": [1, 2, 3], "intensity": 10},
                {"notes": [1, 4, 5], "intensity": 7}
            ]
        })));
        assert!(got.contains("measures[].notes[]"));
        assert!(got.contains("measures[].intensity"));
        assert!(got.contains("name"));
        assert_eq!(got.len(), 3);
    }

    #[test]
    fn classification_predicates() {
        assert!(is_list_of_primitives(&Node::from(json!([1, "a", null]))));
        assert!(!is_list_of_primitives(&Node::from(json!([1, [2]]))));
        assert!(!is_list_of_primitives(&Node::from(json!({"a": 1}))));
        assert!(!is_list_of_primitives(&Node::from(1)));

        assert!(is_list_of_objects(&Node::from(json!([{"a": 1}, null]))));
        assert!(is_list_of_objects(&Node::from(json!([[1], [2]]))));
        assert!(!is_list_of_objects(&Node::from(json!([null, null]))));
        assert!(!is_list_of_objects(&Node::from(json!([{"a": 1}, 2]))));
        assert!(!is_list_of_objects(&Node::from(json!({"x": {"a": 1}}))));
        assert!(!is_list_of_objects(&Node::Null));
    }
}
