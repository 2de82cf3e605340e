//! # Path-Keyed Schemas
//!
//! A schema is an ordered table from compiled path to an entry: a type name
//! for type checks, or a [`RuleSet`] for validation and sanitization. Order
//! is kept exactly as written, both across paths and across the rules of one
//! path, because sanitize transforms run in the order they are listed.
//!
//! ## Rule Spellings
//!
//! | Written | [`RuleSpec`] | Options passed to the collaborator |
//! |---------|--------------|------------------------------------|
//! | `false`, `null` | `Skip` | rule is not run |
//! | `true` | `Defaults` | empty, format `"any"` |
//! | scalar or list | `Format` | `{format: <value>}` |
//! | map | `Options` | the map |
//!
//! Deserialization walks maps in document order and compiles every path
//! key, so a loaded schema never holds an invalid path.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use warden_core::{Node, PathSyntaxError, Scalar, SchemaPath};
use warden_rules::RuleOptions;

/// Rule name the warden handles itself.
pub const REQUIRED: &str = "required";

/// How one rule was written for one path.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleSpec {
    /// `false` or `null`: do not run.
    Skip,
    /// `true`: run with default options.
    Defaults,
    /// Bare scalar or list: shorthand for `{format: value}`.
    Format(Node),
    /// Explicit options.
    Options(BTreeMap<String, Node>),
}

impl RuleSpec {
    /// Classify a written value.
    pub fn from_node(node: Node) -> Self {
        match node {
            Node::Null | Node::Scalar(Scalar::Bool(false)) => Self::Skip,
            Node::Scalar(Scalar::Bool(true)) => Self::Defaults,
            Node::Map(map) => Self::Options(map),
            other => Self::Format(other),
        }
    }

    /// Returns true for [`RuleSpec::Skip`].
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    /// Truthiness, as used for the `required` flag.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Skip => false,
            Self::Defaults => true,
            Self::Format(node) => match node {
                Node::Scalar(Scalar::Int(i)) => *i != 0,
                Node::Scalar(Scalar::Float(f)) => *f != 0.0,
                Node::Scalar(Scalar::String(s)) => !s.is_empty() && s != "0",
                Node::Scalar(_) => true,
                Node::Null | Node::List(_) | Node::Map(_) => !node.is_empty(),
            },
            Self::Options(map) => !map.is_empty(),
        }
    }

    /// Options for a validation rule, or `None` when the rule is skipped.
    pub fn validation_options(&self) -> Option<RuleOptions> {
        match self {
            Self::Skip => None,
            Self::Defaults => Some(RuleOptions::new()),
            Self::Format(format) => Some(RuleOptions::with_format(format.clone())),
            Self::Options(map) => Some(RuleOptions::from_map(map.clone())),
        }
    }

    /// Options for a sanitize transform, or `None` when it is skipped.
    /// Only an explicit map carries options into a transform.
    pub fn sanitize_options(&self) -> Option<RuleOptions> {
        match self {
            Self::Skip => None,
            Self::Defaults | Self::Format(_) => Some(RuleOptions::new()),
            Self::Options(map) => Some(RuleOptions::from_map(map.clone())),
        }
    }
}

impl From<bool> for RuleSpec {
    fn from(value: bool) -> Self {
        if value {
            Self::Defaults
        } else {
            Self::Skip
        }
    }
}

/// Ordered rules for one path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<(String, RuleSpec)>,
}

impl RuleSet {
    /// An empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule, builder style.
    pub fn rule(mut self, name: &str, spec: impl Into<RuleSpec>) -> Self {
        self.push(name, spec.into());
        self
    }

    /// Append a rule. A repeated name replaces the earlier spec in place.
    pub fn push(&mut self, name: &str, spec: RuleSpec) {
        match self.rules.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = spec,
            None => self.rules.push((name.to_string(), spec)),
        }
    }

    /// The spec written for `name`.
    pub fn get(&self, name: &str) -> Option<&RuleSpec> {
        self.rules.iter().find(|(n, _)| n == name).map(|(_, spec)| spec)
    }

    /// True when `required` is present and truthy.
    pub fn is_required(&self) -> bool {
        self.get(REQUIRED).is_some_and(RuleSpec::is_truthy)
    }

    /// Rules in written order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.rules.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rules are written.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<RuleSpec> for RuleSet {
    fn from(spec: RuleSpec) -> Self {
        Self::new().rule(REQUIRED, spec)
    }
}

/// Ordered table from compiled path to entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTable<T> {
    entries: Vec<(SchemaPath, T)>,
}

/// Declared type name per path.
pub type TypeSchema = PathTable<String>;

/// Validation or sanitize rules per path.
pub type RuleSchema = PathTable<RuleSet>;

impl<T> Default for PathTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> PathTable<T> {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `path` and append an entry, builder style.
    ///
    /// # Errors
    ///
    /// Returns [`PathSyntaxError`] if the path does not compile.
    pub fn with(mut self, path: &str, entry: impl Into<T>) -> Result<Self, PathSyntaxError> {
        self.insert(SchemaPath::compile(path)?, entry.into());
        Ok(self)
    }

    /// Append an entry. A repeated path replaces the earlier entry in place.
    pub fn insert(&mut self, path: SchemaPath, entry: T) {
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((path, entry)),
        }
    }

    /// The entry for `path`.
    pub fn get(&self, path: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(p, _)| p.as_str() == path)
            .map(|(_, entry)| entry)
    }

    /// Entries in written order.
    pub fn iter(&self) -> impl Iterator<Item = (&SchemaPath, &T)> {
        self.entries.iter().map(|(path, entry)| (path, entry))
    }

    /// Paths in written order.
    pub fn paths(&self) -> impl Iterator<Item = &SchemaPath> {
        self.entries.iter().map(|(path, _)| path)
    }

    /// Number of paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for PathTable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for TableVisitor<T> {
            type Value = PathTable<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map keyed by path")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut table = PathTable::new();
                while let Some((path, entry)) = map.next_entry::<SchemaPath, T>()? {
                    table.insert(path, entry);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor(PhantomData))
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map keyed by rule name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut set = RuleSet::new();
                while let Some((name, value)) = map.next_entry::<String, Node>()? {
                    set.push(&name, RuleSpec::from_node(value));
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rule_spec_classification() {
        assert_eq!(RuleSpec::from_node(Node::Null), RuleSpec::Skip);
        assert_eq!(RuleSpec::from_node(Node::from(false)), RuleSpec::Skip);
        assert_eq!(RuleSpec::from_node(Node::from(true)), RuleSpec::Defaults);
        assert_eq!(
            RuleSpec::from_node(Node::from("^a$")),
            RuleSpec::Format(Node::from("^a$"))
        );
        assert!(matches!(
            RuleSpec::from_node(Node::from(json!({"min": 1}))),
            RuleSpec::Options(_)
        ));
    }

    #[test]
    fn truthiness_follows_loose_rules() {
        assert!(RuleSpec::Defaults.is_truthy());
        assert!(!RuleSpec::Skip.is_truthy());
        assert!(!RuleSpec::Format(Node::from(0)).is_truthy());
        assert!(!RuleSpec::Format(Node::from("0")).is_truthy());
        assert!(!RuleSpec::Format(Node::from("")).is_truthy());
        assert!(RuleSpec::Format(Node::from("yes")).is_truthy());
        assert!(!RuleSpec::Options(BTreeMap::new()).is_truthy());
    }

    #[test]
    fn validation_options_resolve_format() {
        let opts = RuleSpec::Format(Node::from("^x$")).validation_options().unwrap();
        assert_eq!(opts.format_str(), Some("^x$"));
        assert!(RuleSpec::Skip.validation_options().is_none());
        assert!(RuleSpec::Defaults.validation_options().unwrap().has_default_format());
    }

    #[test]
    fn sanitize_ignores_scalar_shorthand() {
        let opts = RuleSpec::Format(Node::from("x")).sanitize_options().unwrap();
        assert!(opts.values().is_empty());
    }

    #[test]
    fn rule_set_keeps_written_order() {
        let set: RuleSet =
            serde_yaml::from_str("trim: true\nuppercase: true\nnullIfEmpty: true\n").unwrap();
        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["trim", "uppercase", "nullIfEmpty"]);
    }

    #[test]
    fn required_flag() {
        assert!(RuleSet::from(RuleSpec::Defaults).is_required());
        assert!(!RuleSet::new().rule("required", false).is_required());
        assert!(!RuleSet::new().rule("notEmpty", true).is_required());
    }

    #[test]
    fn path_table_compiles_keys_in_order() {
        let table: TypeSchema =
            serde_json::from_str(r#"{"z": "int", "a[].b": "string", "m.n[]": "bool"}"#).unwrap();
        let paths: Vec<&str> = table.paths().map(SchemaPath::as_str).collect();
        assert_eq!(paths, vec!["z", "a[].b", "m.n[]"]);
        assert_eq!(table.get("a[].b").map(String::as_str), Some("string"));
    }

    #[test]
    fn path_table_rejects_bad_paths() {
        assert!(serde_json::from_str::<TypeSchema>(r#"{"a.": "int"}"#).is_err());
        assert!(TypeSchema::new().with("a..b", "int").is_err());
    }
}
