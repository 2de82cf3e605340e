//! # Rule Registry
//!
//! An explicit table of named validation predicates and sanitize
//! transforms. A registry is built once, then handed to the warden by
//! reference; nothing is registered globally.
//!
//! [`RuleRegistry::standard`] ships a small default set:
//!
//! | Validation | Passes when |
//! |------------|-------------|
//! | `notEmpty` | value is not null, not a blank string, not an empty container |
//! | `numeric` | int, float, or numeric string |
//! | `integer` | int or integer string |
//! | `boolean` | bool, `0`/`1`, or a truthy/falsy string |
//! | `alphaNumeric` | non-empty string of letters and digits |
//! | `email` | plausible `local@domain.tld` address |
//! | `date` | date scalar, RFC 3339 string, or `YYYY-MM-DD` |
//! | `inList` | value equals an entry of option `list` (or a list `format`) |
//! | `lengthBetween` | character count within options `min`/`max` |
//! | `range` | number within options `lower`/`upper`, inclusive |
//! | `regex` | string matches the pattern given as `format` |
//!
//! Null passes every standard rule except `notEmpty`.
//!
//! Transforms: `trim`, `lowercase`, `uppercase`, `collapseWhitespace`,
//! `nullIfEmpty`. Each leaves non-string values untouched and is
//! idempotent.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use warden_core::{parse_integer_key, Node, RuleError, Scalar};

use crate::options::{as_number, RuleOptions};
use crate::traits::{RuleEvaluator, SanitizeTransforms};
use crate::types::{parse_bool, TypeName};

/// A validation predicate.
pub type Predicate = Box<dyn Fn(&Node, &RuleOptions) -> Result<bool, RuleError> + Send + Sync>;

/// A sanitize transform.
pub type Transform = Box<dyn Fn(&Node, &RuleOptions) -> Result<Node, RuleError> + Send + Sync>;

static EMAIL: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
});

/// Named predicates and transforms.
#[derive(Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Predicate>,
    transforms: HashMap<String, Transform>,
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.rule_names())
            .field("transforms", &self.transform_names())
            .finish()
    }
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the standard rules and transforms.
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.add_rule("notEmpty", |value, _| Ok(not_empty(value)));
        registry.add_rule("numeric", nullable(|value, _| Ok(as_number(value).is_some())));
        registry.add_rule("integer", nullable(|value, _| Ok(is_integer(value))));
        registry.add_rule("boolean", nullable(|value, _| Ok(is_boolean(value))));
        registry.add_rule(
            "alphaNumeric",
            nullable(|value, _| {
                Ok(scalar_text(value)
                    .is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphanumeric)))
            }),
        );
        registry.add_rule("email", nullable(|value, _| is_email(value)));
        registry.add_rule("date", nullable(|value, _| Ok(is_date(value))));
        registry.add_rule("inList", nullable(in_list));
        registry.add_rule("lengthBetween", nullable(length_between));
        registry.add_rule("range", nullable(in_range));
        registry.add_rule("regex", nullable(matches_pattern));

        registry.add_transform("trim", map_string(|s| s.trim().to_string()));
        registry.add_transform("lowercase", map_string(str::to_lowercase));
        registry.add_transform("uppercase", map_string(str::to_uppercase));
        registry.add_transform(
            "collapseWhitespace",
            map_string(|s| s.split_whitespace().collect::<Vec<_>>().join(" ")),
        );
        registry.add_transform("nullIfEmpty", |value, _| {
            Ok(match value {
                Node::Scalar(Scalar::String(s)) if s.is_empty() => Node::Null,
                other => other.clone(),
            })
        });

        registry
    }

    /// Register (or replace) a validation rule.
    pub fn add_rule<F>(&mut self, name: &str, rule: F) -> &mut Self
    where
        F: Fn(&Node, &RuleOptions) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        self.rules.insert(name.to_string(), Box::new(rule));
        self
    }

    /// Register (or replace) a sanitize transform.
    pub fn add_transform<F>(&mut self, name: &str, transform: F) -> &mut Self
    where
        F: Fn(&Node, &RuleOptions) -> Result<Node, RuleError> + Send + Sync + 'static,
    {
        self.transforms.insert(name.to_string(), Box::new(transform));
        self
    }

    /// True if a validation rule is registered under `name`.
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered rule names, sorted.
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered transform names, sorted.
    pub fn transform_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl RuleEvaluator for RuleRegistry {
    fn evaluate(&self, rule: &str, value: &Node, options: &RuleOptions) -> Result<bool, RuleError> {
        let predicate = self
            .rules
            .get(rule)
            .ok_or_else(|| RuleError::UnknownRule(rule.to_string()))?;
        let passed = predicate(value, options)?;
        trace!(rule, passed, "rule evaluated");
        Ok(passed)
    }

    fn recognized_type_name(&self, name: &str) -> bool {
        TypeName::parse(name).is_some()
    }

    fn value_matches_type(&self, value: &Node, type_name: &str) -> bool {
        TypeName::parse(type_name).is_some_and(|t| t.matches(value))
    }
}

impl SanitizeTransforms for RuleRegistry {
    fn has_transform(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    fn apply_transform(
        &self,
        name: &str,
        value: &Node,
        options: &RuleOptions,
    ) -> Result<Node, RuleError> {
        let transform = self
            .transforms
            .get(name)
            .ok_or_else(|| RuleError::UnknownTransform(name.to_string()))?;
        transform(value, options)
    }
}

/// Wrap a predicate so that null always passes.
fn nullable<F>(rule: F) -> impl Fn(&Node, &RuleOptions) -> Result<bool, RuleError> + Send + Sync
where
    F: Fn(&Node, &RuleOptions) -> Result<bool, RuleError> + Send + Sync,
{
    move |value: &Node, options: &RuleOptions| {
        if value.is_null() {
            Ok(true)
        } else {
            rule(value, options)
        }
    }
}

/// Lift a string function into a transform that ignores non-strings.
fn map_string<F>(f: F) -> impl Fn(&Node, &RuleOptions) -> Result<Node, RuleError> + Send + Sync
where
    F: Fn(&str) -> String + Send + Sync,
{
    move |value: &Node, _: &RuleOptions| {
        Ok(match value {
            Node::Scalar(Scalar::String(s)) => Node::from(f(s.as_str())),
            other => other.clone(),
        })
    }
}

/// String or integer rendered as text; other values have none.
fn scalar_text(value: &Node) -> Option<String> {
    match value {
        Node::Scalar(s @ (Scalar::String(_) | Scalar::Int(_))) => Some(s.render()),
        _ => None,
    }
}

fn not_empty(value: &Node) -> bool {
    match value {
        Node::Null => false,
        Node::Scalar(Scalar::String(s)) => !s.trim().is_empty(),
        Node::Scalar(_) => true,
        Node::List(_) | Node::Map(_) => !value.is_empty(),
    }
}

fn is_integer(value: &Node) -> bool {
    match value {
        Node::Scalar(Scalar::Int(_)) => true,
        Node::Scalar(Scalar::String(s)) => parse_integer_key(s.trim()).is_some(),
        _ => false,
    }
}

fn is_boolean(value: &Node) -> bool {
    match value {
        Node::Scalar(Scalar::Bool(_)) => true,
        Node::Scalar(Scalar::Int(i)) => *i == 0 || *i == 1,
        Node::Scalar(Scalar::String(s)) => !s.trim().is_empty() && parse_bool(s).is_some(),
        _ => false,
    }
}

fn is_email(value: &Node) -> Result<bool, RuleError> {
    let pattern = EMAIL.as_ref().map_err(|e| RuleError::InvalidOptions {
        rule: "email".to_string(),
        reason: e.to_string(),
    })?;
    Ok(value.as_str().is_some_and(|s| pattern.is_match(s)))
}

fn is_date(value: &Node) -> bool {
    match value {
        Node::Scalar(Scalar::Date(_)) => true,
        Node::Scalar(Scalar::String(s)) => {
            DateTime::parse_from_rfc3339(s).is_ok()
                || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        }
        _ => false,
    }
}

fn in_list(value: &Node, options: &RuleOptions) -> Result<bool, RuleError> {
    let list = match (options.get("list"), options.format()) {
        (Some(Node::List(items)), _) | (None, Node::List(items)) => items,
        _ => {
            return Err(RuleError::InvalidOptions {
                rule: "inList".to_string(),
                reason: "option \"list\" must be a list".to_string(),
            })
        }
    };
    let Some(needle) = value.as_scalar() else {
        return Ok(false);
    };
    let needle = needle.render();
    Ok(list
        .iter()
        .filter_map(Node::as_scalar)
        .any(|candidate| candidate.render() == needle))
}

fn length_between(value: &Node, options: &RuleOptions) -> Result<bool, RuleError> {
    let min = options.count("lengthBetween", "min")?.unwrap_or(0);
    let max = options.count("lengthBetween", "max")?.unwrap_or(usize::MAX);
    let Some(text) = value.as_scalar().map(Scalar::render) else {
        return Ok(false);
    };
    let length = text.chars().count();
    Ok(min <= length && length <= max)
}

fn in_range(value: &Node, options: &RuleOptions) -> Result<bool, RuleError> {
    let lower = options.number("range", "lower")?;
    let upper = options.number("range", "upper")?;
    let Some(n) = as_number(value) else {
        return Ok(false);
    };
    Ok(lower.map_or(true, |l| n >= l) && upper.map_or(true, |u| n <= u))
}

fn matches_pattern(value: &Node, options: &RuleOptions) -> Result<bool, RuleError> {
    let invalid = |reason: String| RuleError::InvalidOptions {
        rule: "regex".to_string(),
        reason,
    };
    let pattern = match options.format_str() {
        Some(p) if !options.has_default_format() => p,
        _ => return Err(invalid("a pattern must be given as the format".to_string())),
    };
    let compiled = Regex::new(pattern).map_err(|e| invalid(e.to_string()))?;
    Ok(scalar_text(value).is_some_and(|s| compiled.is_match(&s)))
}
