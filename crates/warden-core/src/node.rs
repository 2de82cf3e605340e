//! # Node — The Four-Case Value Model
//!
//! Every piece of data the engine touches is a [`Node`]: `Null`, a
//! [`Scalar`], an ordered `List`, or a string-keyed `Map`. All recursive
//! logic in the workspace is an exhaustive `match` over these four cases.
//!
//! ## Integer Keys
//!
//! Payloads decoded from loosely-typed sources often encode lists as maps
//! keyed `"0"`, `"1"`, ... The model treats such maps as list-like:
//!
//! - A key is an *integer key* when it is the canonical decimal rendering
//!   of an `i64` (`"0"`, `"17"`, `"-3"`; never `"01"`, `"+1"`, `"-0"`).
//! - A `List` behaves as a map keyed `"0".."n-1"`, so symbol lookup on a
//!   list accepts integer-key strings.
//! - A node is *gap-free* when it is a `List`, or a `Map` holding every
//!   key `"0".."n-1"` where `n` is its length.
//!
//! ## Map Order
//!
//! Maps are `BTreeMap`s. Iteration is in key order, which makes path
//! inference deterministic. Key order carries no meaning anywhere else.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConversionError;
use crate::pointer::{NodePointer, Step};

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// UTC timestamp. Serializes as RFC 3339; never produced by
    /// deserialization, which keeps date-looking strings as strings.
    Date(DateTime<Utc>),
}

impl Scalar {
    /// Type name used in diagnostics and type checks.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Date(_) => "date",
        }
    }

    /// Render the scalar as a plain string.
    ///
    /// Booleans render as `true`/`false`, dates as RFC 3339 with a `Z`
    /// suffix and second precision.
    pub fn render(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => s.clone(),
            Self::Date(d) => d.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A dynamically-typed value: null, scalar, list, or map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Explicit null.
    #[default]
    Null,
    /// A leaf value.
    Scalar(Scalar),
    /// Ordered list.
    List(Vec<Node>),
    /// String-keyed map.
    Map(BTreeMap<String, Node>),
}

/// Shared null, handed out for absent query matches.
pub static NULL: Node = Node::Null;

impl Node {
    /// Build an empty map node.
    pub fn map() -> Self {
        Self::Map(BTreeMap::new())
    }

    /// Type name used in diagnostics and type checks.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(s) => s.type_name(),
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for `List` and `Map`.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }

    /// The scalar payload, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The string payload, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Number of direct children (zero for null and scalars).
    pub fn len(&self) -> usize {
        match self {
            Self::List(items) => items.len(),
            Self::Map(map) => map.len(),
            Self::Null | Self::Scalar(_) => 0,
        }
    }

    /// Returns true when the node has no direct children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a child by key. Lists accept integer-key strings.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.lookup(key).map(|(_, child)| child)
    }

    /// Look up a child by key, returning the step that addresses it.
    pub fn lookup(&self, key: &str) -> Option<(Step, &Node)> {
        match self {
            Self::Map(map) => map.get(key).map(|child| (Step::Key(key.to_string()), child)),
            Self::List(items) => {
                let index = list_index(key)?;
                items.get(index).map(|child| (Step::Index(index), child))
            }
            Self::Null | Self::Scalar(_) => None,
        }
    }

    /// All direct children with their keys, in iteration order.
    pub fn entries(&self) -> Vec<(String, &Node)> {
        match self {
            Self::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, child)| (i.to_string(), child))
                .collect(),
            Self::Map(map) => map.iter().map(|(k, child)| (k.clone(), child)).collect(),
            Self::Null | Self::Scalar(_) => Vec::new(),
        }
    }

    /// Returns true when every key is an integer key (always true for lists).
    pub fn has_integer_keys(&self) -> bool {
        match self {
            Self::List(_) => true,
            Self::Map(map) => map.keys().all(|k| is_integer_key(k)),
            Self::Null | Self::Scalar(_) => false,
        }
    }

    /// Returns true for lists, and for maps keyed exactly `"0".."n-1"`.
    pub fn is_gap_free(&self) -> bool {
        match self {
            Self::List(_) => true,
            Self::Map(map) => (0..map.len()).all(|i| map.contains_key(&i.to_string())),
            Self::Null | Self::Scalar(_) => false,
        }
    }

    /// The `index`-th element of a gap-free node, with its addressing step.
    pub fn element(&self, index: usize) -> Option<(Step, &Node)> {
        match self {
            Self::List(items) => items.get(index).map(|child| (Step::Index(index), child)),
            Self::Map(map) => {
                let key = index.to_string();
                map.get(&key).map(|child| (Step::Key(key), child))
            }
            Self::Null | Self::Scalar(_) => None,
        }
    }

    /// Follow one step.
    pub fn step(&self, step: &Step) -> Option<&Node> {
        match (self, step) {
            (Self::List(items), Step::Index(i)) => items.get(*i),
            (Self::Map(map), Step::Index(i)) => map.get(&i.to_string()),
            (_, Step::Key(key)) => self.get(key),
            (Self::Null | Self::Scalar(_), Step::Index(_)) => None,
        }
    }

    /// Follow one step, mutably.
    pub fn step_mut(&mut self, step: &Step) -> Option<&mut Node> {
        match (self, step) {
            (Self::List(items), Step::Index(i)) => items.get_mut(*i),
            (Self::List(items), Step::Key(key)) => {
                let index = list_index(key)?;
                items.get_mut(index)
            }
            (Self::Map(map), Step::Index(i)) => map.get_mut(&i.to_string()),
            (Self::Map(map), Step::Key(key)) => map.get_mut(key),
            (Self::Null | Self::Scalar(_), _) => None,
        }
    }

    /// Resolve a pointer from this node.
    pub fn resolve(&self, pointer: &NodePointer) -> Option<&Node> {
        pointer
            .steps()
            .iter()
            .try_fold(self, |node, step| node.step(step))
    }

    /// Resolve a pointer from this node, mutably.
    pub fn resolve_mut(&mut self, pointer: &NodePointer) -> Option<&mut Node> {
        let mut node = self;
        for step in pointer.steps() {
            node = node.step_mut(step)?;
        }
        Some(node)
    }

    /// Convert a `serde_json::Value` tree.
    ///
    /// Integers outside the `i64` range become floats.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Scalar(Scalar::Int(i)),
                None => Self::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert a `serde_yaml::Value` tree.
    ///
    /// YAML tags are ignored; scalar map keys are stringified.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] for map keys that are themselves
    /// sequences, mappings, or null, and for numbers with no `i64`/`f64`
    /// representation.
    pub fn from_yaml(value: &serde_yaml::Value) -> Result<Self, ConversionError> {
        use serde_yaml::Value as Yaml;
        match value {
            Yaml::Null => Ok(Self::Null),
            Yaml::Bool(b) => Ok(Self::Scalar(Scalar::Bool(*b))),
            Yaml::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Scalar(Scalar::Int(i)))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Scalar(Scalar::Float(f)))
                } else {
                    Err(ConversionError(format!("unsupported YAML number: {n:?}")))
                }
            }
            Yaml::String(s) => Ok(Self::Scalar(Scalar::String(s.clone()))),
            Yaml::Sequence(seq) => {
                let items: Result<Vec<Node>, ConversionError> =
                    seq.iter().map(Self::from_yaml).collect();
                Ok(Self::List(items?))
            }
            Yaml::Mapping(mapping) => {
                let mut map = BTreeMap::new();
                for (k, v) in mapping {
                    let key = match k {
                        Yaml::String(s) => s.clone(),
                        Yaml::Number(n) => n.to_string(),
                        Yaml::Bool(b) => b.to_string(),
                        other => {
                            return Err(ConversionError(format!(
                                "unsupported YAML map key: {other:?}"
                            )))
                        }
                    };
                    map.insert(key, Self::from_yaml(v)?);
                }
                Ok(Self::Map(map))
            }
            Yaml::Tagged(tagged) => Self::from_yaml(&tagged.value),
        }
    }

    /// Convert into a `serde_json::Value` tree.
    ///
    /// Non-finite floats become `null`; dates become RFC 3339 strings.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Self::Scalar(Scalar::Int(i)) => Value::from(*i),
            Self::Scalar(Scalar::Float(f)) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Scalar(s @ (Scalar::String(_) | Scalar::Date(_))) => Value::String(s.render()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Parse an integer key: the canonical decimal rendering of an `i64`.
pub fn parse_integer_key(key: &str) -> Option<i64> {
    let digits = key.strip_prefix('-').unwrap_or(key);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if key == "-0" {
        return None;
    }
    key.parse().ok()
}

/// Returns true if `key` is an integer key.
pub fn is_integer_key(key: &str) -> bool {
    parse_integer_key(key).is_some()
}

fn list_index(key: &str) -> Option<usize> {
    parse_integer_key(key).and_then(|i| usize::try_from(i).ok())
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Self::from_json(value)
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Int(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Scalar(Scalar::Float(value))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::String(value))
    }
}

impl From<DateTime<Utc>> for Node {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Scalar(Scalar::Date(value))
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<String, Node>> for Node {
    fn from(value: BTreeMap<String, Node>) -> Self {
        Self::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn integer_keys_are_canonical() {
        assert_eq!(parse_integer_key("0"), Some(0));
        assert_eq!(parse_integer_key("17"), Some(17));
        assert_eq!(parse_integer_key("-3"), Some(-3));
        assert_eq!(parse_integer_key("01"), None);
        assert_eq!(parse_integer_key("-0"), None);
        assert_eq!(parse_integer_key("+1"), None);
        assert_eq!(parse_integer_key(" 1"), None);
        assert_eq!(parse_integer_key(""), None);
        assert_eq!(parse_integer_key("-"), None);
        assert_eq!(parse_integer_key("1a"), None);
        assert_eq!(parse_integer_key("99999999999999999999"), None);
    }

    #[test]
    fn from_json_maps_every_case() {
        let node = Node::from(json!({
            "n": null, "b": true, "i": 3, "f": 1.5, "s": "x", "l": [1], "m": {}
        }));
        assert_eq!(node.get("n"), Some(&Node::Null));
        assert_eq!(node.get("b"), Some(&Node::from(true)));
        assert_eq!(node.get("i"), Some(&Node::from(3)));
        assert_eq!(node.get("f"), Some(&Node::from(1.5)));
        assert_eq!(node.get("s"), Some(&Node::from("x")));
        assert_eq!(node.get("l"), Some(&Node::List(vec![Node::from(1)])));
        assert_eq!(node.get("m"), Some(&Node::map()));
    }

    #[test]
    fn json_round_trip_preserves_shape() {
        let value = json!({"a": [1, 2.5, "x", null, {"b": false}]});
        assert_eq!(Node::from(value.clone()).to_json(), value);
    }

    #[test]
    fn serde_untagged_matches_json_shape() {
        let node: Node = serde_json::from_str(r#"{"a": [1, "x", null], "b": 2.5}"#).unwrap();
        assert_eq!(
            node,
            Node::from(json!({"a": [1, "x", null], "b": 2.5}))
        );
        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back, json!({"a": [1, "x", null], "b": 2.5}));
    }

    #[test]
    fn dates_render_as_rfc3339() {
        let date = Utc.with_ymd_and_hms(2011, 8, 23, 12, 0, 0).unwrap();
        let node = Node::from(date);
        assert_eq!(node.type_name(), "date");
        assert_eq!(node.to_json(), json!("2011-08-23T12:00:00Z"));
    }

    #[test]
    fn list_lookup_accepts_integer_keys() {
        let node = Node::from(json!(["a", "b", "c"]));
        assert_eq!(node.get("1"), Some(&Node::from("b")));
        assert_eq!(node.get("01"), None);
        assert_eq!(node.get("-1"), None);
        assert_eq!(node.get("3"), None);
        assert_eq!(node.get("x"), None);
    }

    #[test]
    fn gap_free_detection() {
        assert!(Node::from(json!([])).is_gap_free());
        assert!(Node::from(json!({"0": "x", "1": "y"})).is_gap_free());
        assert!(!Node::from(json!({"0": "x", "2": "y"})).is_gap_free());
        assert!(!Node::from(json!({"a": 1})).is_gap_free());
        assert!(Node::from(json!({})).is_gap_free());
        assert!(!Node::from("x").is_gap_free());
        assert!(!Node::Null.is_gap_free());
    }

    #[test]
    fn integer_key_detection() {
        assert!(Node::from(json!({"0": 1, "5": 2, "-1": 3})).has_integer_keys());
        assert!(!Node::from(json!({"0": 1, "x": 2})).has_integer_keys());
        assert!(Node::from(json!([1, 2])).has_integer_keys());
        assert!(!Node::from(1).has_integer_keys());
    }

    #[test]
    fn element_addresses_maps_by_string_key() {
        let node = Node::from(json!({"0": "x", "1": "y"}));
        let (step, child) = node.element(1).unwrap();
        assert_eq!(step, Step::Key("1".to_string()));
        assert_eq!(child, &Node::from("y"));
    }

    #[test]
    fn resolve_and_resolve_mut_follow_pointers() {
        let mut node = Node::from(json!({"a": [{"b": 1}, {"b": 2}]}));
        let pointer = NodePointer::root()
            .child(Step::Key("a".to_string()))
            .child(Step::Index(1))
            .child(Step::Key("b".to_string()));
        assert_eq!(node.resolve(&pointer), Some(&Node::from(2)));

        if let Some(slot) = node.resolve_mut(&pointer) {
            *slot = Node::from("two");
        }
        assert_eq!(node, Node::from(json!({"a": [{"b": 1}, {"b": "two"}]})));
    }

    #[test]
    fn resolve_missing_step_is_none() {
        let node = Node::from(json!({"a": 1}));
        let pointer = NodePointer::root()
            .child(Step::Key("a".to_string()))
            .child(Step::Key("b".to_string()));
        assert_eq!(node.resolve(&pointer), None);
    }

    #[test]
    fn from_yaml_stringifies_scalar_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\nname: x\n").unwrap();
        let node = Node::from_yaml(&yaml).unwrap();
        assert_eq!(node.get("1"), Some(&Node::from("one")));
        assert_eq!(node.get("true"), Some(&Node::from("yes")));
        assert_eq!(node.get("name"), Some(&Node::from("x")));
    }

    #[test]
    fn from_yaml_rejects_null_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("~: x\n").unwrap();
        assert!(Node::from_yaml(&yaml).is_err());
    }

    #[test]
    fn scalar_render_forms() {
        assert_eq!(Scalar::Bool(true).render(), "true");
        assert_eq!(Scalar::Int(-4).render(), "-4");
        assert_eq!(Scalar::Float(2.5).render(), "2.5");
        assert_eq!(Scalar::String("x".into()).render(), "x");
    }
}
