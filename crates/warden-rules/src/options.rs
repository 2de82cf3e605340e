//! # Rule Options
//!
//! The resolved options a rule or transform is invoked with. Schema
//! documents allow three spellings (`true`, a bare scalar, or a map); by the
//! time a collaborator sees them they are always a [`RuleOptions`], with the
//! `format` entry pulled out and defaulted to `"any"`.

use std::collections::BTreeMap;

use warden_core::{Node, RuleError, Scalar};

/// Format used when a rule is given none.
pub const DEFAULT_FORMAT: &str = "any";

/// Resolved options for one rule invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOptions {
    format: Node,
    values: BTreeMap<String, Node>,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            format: Node::from(DEFAULT_FORMAT),
            values: BTreeMap::new(),
        }
    }
}

impl RuleOptions {
    /// Empty options with the default format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options holding only a format (the bare-scalar shorthand).
    pub fn with_format(format: impl Into<Node>) -> Self {
        let format = format.into();
        let mut values = BTreeMap::new();
        values.insert("format".to_string(), format.clone());
        Self { format, values }
    }

    /// Options from an explicit map. A `format` key becomes the format.
    pub fn from_map(values: BTreeMap<String, Node>) -> Self {
        let format = values
            .get("format")
            .cloned()
            .unwrap_or_else(|| Node::from(DEFAULT_FORMAT));
        Self { format, values }
    }

    /// The format value.
    pub fn format(&self) -> &Node {
        &self.format
    }

    /// The format, when it is a string.
    pub fn format_str(&self) -> Option<&str> {
        self.format.as_str()
    }

    /// True when no format was given.
    pub fn has_default_format(&self) -> bool {
        self.format_str() == Some(DEFAULT_FORMAT)
    }

    /// A raw option value.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.values.get(key)
    }

    /// All option values, including `format` when one was given.
    pub fn values(&self) -> &BTreeMap<String, Node> {
        &self.values
    }

    /// A numeric option. Numeric strings are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidOptions`] if the option is present but
    /// not a number.
    pub fn number(&self, rule: &str, key: &str) -> Result<Option<f64>, RuleError> {
        match self.values.get(key) {
            None | Some(Node::Null) => Ok(None),
            Some(node) => as_number(node).map(Some).ok_or_else(|| RuleError::InvalidOptions {
                rule: rule.to_string(),
                reason: format!("option \"{key}\" must be a number, got {}", node.type_name()),
            }),
        }
    }

    /// A non-negative integer option.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidOptions`] if the option is present but
    /// not a non-negative integer.
    pub fn count(&self, rule: &str, key: &str) -> Result<Option<usize>, RuleError> {
        match self.values.get(key) {
            None | Some(Node::Null) => Ok(None),
            Some(Node::Scalar(Scalar::Int(n))) if *n >= 0 => Ok(usize::try_from(*n).ok()),
            Some(node) => Err(RuleError::InvalidOptions {
                rule: rule.to_string(),
                reason: format!(
                    "option \"{key}\" must be a non-negative integer, got {}",
                    node.type_name()
                ),
            }),
        }
    }
}

/// Read a node as a number: ints, floats, and numeric strings.
pub fn as_number(node: &Node) -> Option<f64> {
    match node {
        Node::Scalar(Scalar::Int(i)) => Some(*i as f64),
        Node::Scalar(Scalar::Float(f)) => Some(*f),
        Node::Scalar(Scalar::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_is_any() {
        let options = RuleOptions::new();
        assert_eq!(options.format_str(), Some("any"));
        assert!(options.has_default_format());
        assert!(options.values().is_empty());
    }

    #[test]
    fn with_format_exposes_format_as_option_too() {
        let options = RuleOptions::with_format("^a+$");
        assert_eq!(options.format_str(), Some("^a+$"));
        assert_eq!(options.get("format"), Some(&Node::from("^a+$")));
        assert!(!options.has_default_format());
    }

    #[test]
    fn from_map_pulls_out_format() {
        let mut values = BTreeMap::new();
        values.insert("min".to_string(), Node::from(2));
        let options = RuleOptions::from_map(values.clone());
        assert!(options.has_default_format());

        values.insert("format".to_string(), Node::from("x"));
        assert_eq!(RuleOptions::from_map(values).format_str(), Some("x"));
    }

    #[test]
    fn number_accepts_numeric_strings() {
        let mut values = BTreeMap::new();
        values.insert("lower".to_string(), Node::from(" 1.5 "));
        values.insert("upper".to_string(), Node::from(true));
        let options = RuleOptions::from_map(values);
        assert_eq!(options.number("range", "lower").unwrap(), Some(1.5));
        assert_eq!(options.number("range", "missing").unwrap(), None);
        assert!(options.number("range", "upper").is_err());
    }

    #[test]
    fn count_rejects_negative() {
        let mut values = BTreeMap::new();
        values.insert("min".to_string(), Node::from(-1));
        values.insert("max".to_string(), Node::from(3));
        let options = RuleOptions::from_map(values);
        assert!(options.count("lengthBetween", "min").is_err());
        assert_eq!(options.count("lengthBetween", "max").unwrap(), Some(3));
    }
}
