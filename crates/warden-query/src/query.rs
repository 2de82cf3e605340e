//! # Path Query Engine
//!
//! Runs a compiled [`SchemaPath`] against a [`Node`] tree and returns
//! pointers to every matching value, together with an [`Inspection`] of
//! every concrete path the traversal touched.
//!
//! ## Segment Semantics
//!
//! | Separator | Value found | Outcome |
//! |-----------|-------------|---------|
//! | any       | key absent, or parent not a container | `undefined` at `<acc>` |
//! | any       | null | hit at `<acc><separator>` |
//! | `""`      | anything | hit at `<acc>` |
//! | `"[]"`    | gap-free list | hit at `<acc>[i]` per element |
//! | `"[]"`    | anything else | fatal [`QueryError::TypedPath`] |
//! | `"[]."`   | gap-free list | recurse per element under `<acc>[i].` |
//! | `"[]."`   | anything else | `wrong_type` at `<acc>[].` |
//! | `"."`     | anything | recurse under `<acc>.` |
//!
//! Inside `"[]."` recursion, misses also push a [`QueryMatch::Absent`]
//! placeholder so that element positions line up with results.

use tracing::{debug, warn};

use warden_core::{Node, NodePointer, QueryError, SchemaPath, Segment, SeparatorKind, NULL};

use crate::inspection::{Inspection, PathStatus};

/// Shape a `"[]"` or `"[]."` target must have.
const EXPECTED_LIST: &str = "numerical-array";

/// One entry in a query's result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMatch {
    /// A value exists at this pointer.
    Found(NodePointer),
    /// Placeholder for a miss inside an object list. Reads as null.
    Absent,
}

impl QueryMatch {
    /// The pointer, for found matches.
    pub fn pointer(&self) -> Option<&NodePointer> {
        match self {
            Self::Found(pointer) => Some(pointer),
            Self::Absent => None,
        }
    }

    /// Read the matched value from `root`. Absent matches, and pointers that
    /// no longer resolve, read as null.
    pub fn resolve<'d>(&self, root: &'d Node) -> &'d Node {
        self.pointer()
            .and_then(|pointer| root.resolve(pointer))
            .unwrap_or(&NULL)
    }
}

/// An executed query.
#[derive(Debug, Clone)]
pub struct Query {
    path: SchemaPath,
    name: String,
    inspection: Inspection,
    results: Vec<QueryMatch>,
}

/// Accumulators threaded through the walker.
#[derive(Default)]
struct Walk {
    inspection: Inspection,
    results: Vec<QueryMatch>,
}

impl Query {
    /// Compile `path` and run it against `data`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Syntax`] if the path does not compile and
    /// [`QueryError::TypedPath`] if a `"[]"` segment lands on something
    /// other than a gap-free list.
    pub fn exec(path: &str, data: &Node, name: &str) -> Result<Self, QueryError> {
        let compiled = SchemaPath::compile_named(path, name)?;
        Self::run(&compiled, data, name)
    }

    /// Run an already-compiled path against `data`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::TypedPath`] if a `"[]"` segment lands on
    /// something other than a gap-free list.
    pub fn run(path: &SchemaPath, data: &Node, name: &str) -> Result<Self, QueryError> {
        let mut walk = Walk::default();

        if path.is_root() {
            walk.inspection.record("", PathStatus::Hit);
            walk.results.push(QueryMatch::Found(NodePointer::root()));
        } else {
            descend(data, path.segments(), "", &NodePointer::root(), false, &mut walk)?;
        }

        let query = Self {
            path: path.clone(),
            name: name.to_string(),
            inspection: walk.inspection,
            results: walk.results,
        };
        debug!(
            path = %query.path,
            name = %query.name,
            hits = query.result_paths().len(),
            misses = query.missed_paths().len(),
            "query executed"
        );
        Ok(query)
    }

    /// The compiled path this query ran.
    pub fn path(&self) -> &SchemaPath {
        &self.path
    }

    /// Debug name carried into diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-concrete-path report.
    pub fn inspection(&self) -> &Inspection {
        &self.inspection
    }

    /// True if any concrete path was a hit.
    pub fn has_hit(&self) -> bool {
        self.inspection.iter().any(|(_, status)| status.is_hit())
    }

    /// True if every concrete path was a hit. False for an empty report.
    pub fn has_hit_all(&self) -> bool {
        !self.inspection.is_empty() && self.inspection.iter().all(|(_, status)| status.is_hit())
    }

    /// True if an object-list segment found the wrong shape.
    pub fn has_type_mismatch(&self) -> bool {
        self.inspection
            .iter()
            .any(|(_, status)| status == PathStatus::TypeMismatch)
    }

    /// Concrete paths that were not hits, in report order.
    pub fn missed_paths(&self) -> Vec<&str> {
        self.inspection
            .iter()
            .filter(|(_, status)| !status.is_hit())
            .map(|(path, _)| path)
            .collect()
    }

    /// Status recorded for a concrete path, if any.
    pub fn miss_reason(&self, concrete: &str) -> Option<PathStatus> {
        self.inspection.get(concrete)
    }

    /// Concrete paths that were hits, in report order.
    pub fn result_paths(&self) -> Vec<&str> {
        self.inspection
            .iter()
            .filter(|(_, status)| status.is_hit())
            .map(|(path, _)| path)
            .collect()
    }

    /// Matches in traversal order.
    pub fn results(&self) -> &[QueryMatch] {
        &self.results
    }

    /// Read every match from `data`; absent matches read as null.
    pub fn values<'d>(&self, data: &'d Node) -> Vec<&'d Node> {
        self.results.iter().map(|m| m.resolve(data)).collect()
    }
}

fn descend(
    node: &Node,
    segments: &[Segment],
    prefix: &str,
    pointer: &NodePointer,
    include_undefined: bool,
    walk: &mut Walk,
) -> Result<(), QueryError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(());
    };
    let here = format!("{prefix}{}", segment.symbol());

    let Some((step, value)) = node.lookup(segment.symbol()) else {
        walk.inspection.record(here, PathStatus::Undefined);
        if include_undefined {
            walk.results.push(QueryMatch::Absent);
        }
        return Ok(());
    };
    let pointer = pointer.child(step);

    if value.is_null() {
        walk.inspection
            .record(format!("{here}{}", segment.kind()), PathStatus::Hit);
        walk.results.push(QueryMatch::Found(pointer));
        return Ok(());
    }

    match segment.kind() {
        SeparatorKind::Leaf => {
            walk.inspection.record(here, PathStatus::Hit);
            walk.results.push(QueryMatch::Found(pointer));
        }
        SeparatorKind::FlatList => {
            if !value.is_gap_free() {
                return Err(QueryError::TypedPath {
                    path: format!("{here}[]"),
                    expected: EXPECTED_LIST.to_string(),
                    actual: value.type_name().to_string(),
                });
            }
            for i in 0..value.len() {
                if let Some((step, _)) = value.element(i) {
                    walk.inspection.record(format!("{here}[{i}]"), PathStatus::Hit);
                    walk.results.push(QueryMatch::Found(pointer.child(step)));
                }
            }
        }
        SeparatorKind::ObjectList => {
            if !value.is_gap_free() {
                warn!(
                    path = %format!("{here}[]."),
                    actual = value.type_name(),
                    "object list segment found the wrong shape"
                );
                walk.inspection
                    .record(format!("{here}[]."), PathStatus::TypeMismatch);
                walk.results.push(QueryMatch::Absent);
                return Ok(());
            }
            for i in 0..value.len() {
                let Some((step, element)) = value.element(i) else {
                    continue;
                };
                if element.is_null() {
                    walk.inspection.record(here.clone(), PathStatus::Hit);
                    continue;
                }
                descend(
                    element,
                    rest,
                    &format!("{here}[{i}]."),
                    &pointer.child(step),
                    true,
                    walk,
                )?;
            }
        }
        SeparatorKind::Object => {
            descend(value, rest, &format!("{here}."), &pointer, include_undefined, walk)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: serde_json::Value) -> Node {
        Node::from(value)
    }

    #[test]
    fn root_path_returns_root() {
        let d = data(json!({"a": 1}));
        let q = Query::exec("", &d, "").unwrap();
        assert_eq!(q.results(), &[QueryMatch::Found(NodePointer::root())]);
        assert_eq!(q.inspection().get(""), Some(PathStatus::Hit));
        assert_eq!(q.values(&d), vec![&d]);
    }

    #[test]
    fn leaf_hit() {
        let d = data(json!({"a": {"b": 7}}));
        let q = Query::exec("a.b", &d, "").unwrap();
        assert!(q.has_hit_all());
        assert_eq!(q.result_paths(), vec!["a.b"]);
        assert_eq!(q.values(&d), vec![&Node::from(7)]);
    }

    #[test]
    fn missing_key_is_undefined_without_placeholder() {
        let d = data(json!({"a": {}}));
        let q = Query::exec("a.b", &d, "").unwrap();
        assert!(!q.has_hit());
        assert_eq!(q.missed_paths(), vec!["a.b"]);
        assert_eq!(q.miss_reason("a.b"), Some(PathStatus::Undefined));
        assert!(q.results().is_empty());
    }

    #[test]
    fn scalar_parent_is_undefined() {
        let d = data(json!({"a": "text"}));
        let q = Query::exec("a.b", &d, "").unwrap();
        assert_eq!(q.miss_reason("a.b"), Some(PathStatus::Undefined));
    }

    #[test]
    fn null_short_circuits_with_separator_suffix() {
        let d = data(json!({"a": null}));
        let q = Query::exec("a.b.c", &d, "").unwrap();
        assert_eq!(q.result_paths(), vec!["a."]);
        assert_eq!(q.values(&d), vec![&Node::Null]);

        let q = Query::exec("a[]", &d, "").unwrap();
        assert_eq!(q.result_paths(), vec!["a[]"]);
    }

    #[test]
    fn flat_list_hits_every_index() {
        let d = data(json!({"tags": ["x", "y"]}));
        let q = Query::exec("tags[]", &d, "").unwrap();
        assert_eq!(q.result_paths(), vec!["tags[0]", "tags[1]"]);
        assert_eq!(q.values(&d), vec![&Node::from("x"), &Node::from("y")]);
    }

    #[test]
    fn empty_flat_list_has_no_hits() {
        let d = data(json!({"tags": []}));
        let q = Query::exec("tags[]", &d, "").unwrap();
        assert!(q.inspection().is_empty());
        assert!(!q.has_hit_all());
    }

    #[test]
    fn flat_list_on_scalar_is_fatal() {
        let d = data(json!({"tags": "x"}));
        let err = Query::exec("tags[]", &d, "").unwrap_err();
        assert_eq!(
            err,
            QueryError::TypedPath {
                path: "tags[]".to_string(),
                expected: "numerical-array".to_string(),
                actual: "string".to_string(),
            }
        );
    }

    #[test]
    fn flat_list_on_gapped_map_is_fatal() {
        let d = data(json!({"a": {"0": "x", "2": "y"}}));
        assert!(matches!(
            Query::exec("a[]", &d, "").unwrap_err(),
            QueryError::TypedPath { .. }
        ));
    }

    #[test]
    fn object_list_on_gapped_map_is_soft() {
        let d = data(json!({"a": {"0": "x", "2": "y"}}));
        let q = Query::exec("a[].b", &d, "").unwrap();
        assert!(q.has_type_mismatch());
        assert_eq!(q.miss_reason("a[]."), Some(PathStatus::TypeMismatch));
        assert_eq!(q.results(), &[QueryMatch::Absent]);
    }

    #[test]
    fn object_list_pushes_placeholders_for_missing_keys() {
        let d = data(json!({"m": [{"r": "high"}, {"t": "x"}]}));
        let q = Query::exec("m[].r", &d, "").unwrap();
        assert_eq!(q.result_paths(), vec!["m[0].r"]);
        assert_eq!(q.missed_paths(), vec!["m[1].r"]);
        assert_eq!(q.values(&d), vec![&Node::from("high"), &Node::Null]);
    }

    #[test]
    fn object_list_null_element_hits_without_index() {
        let d = data(json!({"m": [null, {"r": 1}]}));
        let q = Query::exec("m[].r", &d, "").unwrap();
        assert_eq!(q.result_paths(), vec!["m", "m[1].r"]);
        assert_eq!(q.results().len(), 1);
    }

    #[test]
    fn object_list_over_integer_keyed_map() {
        let d = data(json!({"m": {"0": {"r": 1}, "1": {"r": 2}}}));
        let q = Query::exec("m[].r", &d, "").unwrap();
        assert_eq!(q.values(&d), vec![&Node::from(1), &Node::from(2)]);
    }

    #[test]
    fn nested_object_lists_qualify_every_level() {
        let d = data(json!({"a": [{"b": [{"c": 1}, {"c": 2}]}]}));
        let q = Query::exec("a[].b[].c", &d, "").unwrap();
        assert_eq!(q.result_paths(), vec!["a[0].b[0].c", "a[0].b[1].c"]);
    }

    #[test]
    fn pointers_can_be_written_through() {
        let mut d = data(json!({"m": [{"r": "a"}, {"r": "b"}]}));
        let q = Query::exec("m[].r", &d, "").unwrap();
        for found in q.results().iter().filter_map(QueryMatch::pointer) {
            if let Some(slot) = d.resolve_mut(found) {
                *slot = Node::from("z");
            }
        }
        assert_eq!(d, data(json!({"m": [{"r": "z"}, {"r": "z"}]})));
    }

    #[test]
    fn syntax_errors_carry_the_name() {
        let d = Node::Null;
        match Query::exec("a..b", &d, "order").unwrap_err() {
            QueryError::Syntax(err) => assert_eq!(err.name, "order"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
