//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Taxonomy
//!
//! - [`PathSyntaxError`] — a path string does not conform to the grammar.
//! - [`QueryError`] — a query could not be executed: either the path failed
//!   to compile, or a flat-list segment (`"[]"`) hit something other than a
//!   gap-free list.
//! - [`RuleError`] — a rule collaborator was asked for a rule or transform
//!   it does not know, or was handed unusable options.
//! - [`SchemaError`] — schema-level failures raised by the warden. Each
//!   variant carries the debug name, the path, and the rule or type involved.
//!
//! Soft shape violations inside object lists (`"[]."`) are not errors. They
//! are recorded in a query's inspection report instead.

use thiserror::Error;

/// A path string that does not conform to the path grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("schema \"{name}\" failed to parse path \"{path}\" at byte {position}: {reason}")]
pub struct PathSyntaxError {
    /// The offending path string, verbatim.
    pub path: String,
    /// Debug name of the schema or query the path belongs to.
    pub name: String,
    /// Byte offset at which the scanner gave up.
    pub position: usize,
    /// Human-readable description of the problem.
    pub reason: String,
}

/// Error raised while executing a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The query path did not compile.
    #[error(transparent)]
    Syntax(#[from] PathSyntaxError),

    /// A `"[]"` segment resolved to something other than a gap-free list.
    #[error("failed type check: \"{path}\". Expected: \"{expected}\". Actual: \"{actual}\".")]
    TypedPath {
        /// Concrete path of the offending node, ending in `[]`.
        path: String,
        /// Shape the path required.
        expected: String,
        /// Type name of the node that was found.
        actual: String,
    },
}

/// Error raised by a rule or transform collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// No validation rule is registered under this name.
    #[error("unknown validation rule \"{0}\"")]
    UnknownRule(String),

    /// No sanitize transform is registered under this name.
    #[error("unknown sanitize transform \"{0}\"")]
    UnknownTransform(String),

    /// The rule exists but its options cannot be used.
    #[error("invalid options for rule \"{rule}\": {reason}")]
    InvalidOptions {
        /// Rule name.
        rule: String,
        /// What was wrong with the options.
        reason: String,
    },
}

/// A document value that has no counterpart in the [`Node`](crate::Node) model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported document value: {0}")]
pub struct ConversionError(pub String);

/// Schema-level failure raised by the warden.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A required path was not present in the data.
    #[error("missing required path \"{path}\" in \"{name}\" (first absent at \"{concrete}\")")]
    RequiredFieldMissing {
        /// The declared required path.
        path: String,
        /// The concrete path at which the data ran out.
        concrete: String,
        /// Debug name of the schema.
        name: String,
    },

    /// The data contains a path the schema does not declare.
    #[error("schema \"{name}\" does not define the path \"{path}\"")]
    UnknownField {
        /// Debug name of the schema.
        name: String,
        /// The undeclared path, as emitted by the mapper.
        path: String,
    },

    /// A value does not satisfy its declared type, even after coercion.
    #[error("failed type check: \"{path}\". Expected: \"{expected}\". Actual: \"{actual}\".")]
    TypeMismatch {
        /// Qualified path (`<name>.<path>`).
        path: String,
        /// Declared type name.
        expected: String,
        /// Type name of the offending value.
        actual: String,
    },

    /// A validation rule returned false.
    #[error("schema \"{path}\" failed validation fn \"{rule}\"")]
    ValidationFailed {
        /// Qualified path (`<name>.<path>`).
        path: String,
        /// Name of the failing rule.
        rule: String,
    },

    /// A sanitize rule named a transform that does not exist.
    #[error("failed to sanitize \"{path}\" using \"{rule}\"")]
    SanitizeFailed {
        /// Qualified path (`<name>.<path>`).
        path: String,
        /// Name of the unknown transform.
        rule: String,
    },

    /// A schema definition is unusable against this data.
    #[error("schema \"{name}\" failed to parse. Path: \"{path}\": {reason}")]
    SchemaParse {
        /// Declared path.
        path: String,
        /// Debug name of the schema.
        name: String,
        /// Why the definition was rejected.
        reason: String,
    },

    /// A validation schema references a rule the evaluator does not know.
    #[error("schema \"{path}\" references unknown validation rule \"{rule}\"")]
    UnknownRule {
        /// Qualified path (`<name>.<path>`).
        path: String,
        /// Name of the unknown rule.
        rule: String,
    },

    /// A rule collaborator failed for another reason.
    #[error("rule error at \"{path}\": {source}")]
    Rule {
        /// Qualified path (`<name>.<path>`).
        path: String,
        /// The underlying collaborator error.
        #[source]
        source: RuleError,
    },

    /// A query failed while the warden was executing it.
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Join a debug name and a path the way error messages present them.
///
/// An empty name yields the bare path.
pub fn qualified(name: &str, path: &str) -> String {
    if name.is_empty() {
        path.to_string()
    } else {
        format!("{name}.{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_joins_with_dot() {
        assert_eq!(qualified("order", "items[].sku"), "order.items[].sku");
        assert_eq!(qualified("", "items[].sku"), "items[].sku");
    }

    #[test]
    fn syntax_error_display_mentions_path_and_name() {
        let err = PathSyntaxError {
            path: "a..b".to_string(),
            name: "piece".to_string(),
            position: 2,
            reason: "expected a symbol, found '.'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"a..b\""));
        assert!(msg.contains("\"piece\""));
        assert!(msg.contains("byte 2"));
    }

    #[test]
    fn query_error_wraps_syntax_error_transparently() {
        let inner = PathSyntaxError {
            path: "a.".to_string(),
            name: String::new(),
            position: 2,
            reason: "path cannot end with \".\"".to_string(),
        };
        let err: QueryError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
    }

    #[test]
    fn schema_error_from_query_error() {
        let err: SchemaError = QueryError::TypedPath {
            path: "a[]".to_string(),
            expected: "numerical-array".to_string(),
            actual: "string".to_string(),
        }
        .into();
        assert!(matches!(err, SchemaError::Query(QueryError::TypedPath { .. })));
        assert!(err.to_string().contains("numerical-array"));
    }

    #[test]
    fn rule_error_is_exposed_as_source() {
        use std::error::Error as _;
        let err = SchemaError::Rule {
            path: "a".to_string(),
            source: RuleError::InvalidOptions {
                rule: "regex".to_string(),
                reason: "bad pattern".to_string(),
            },
        };
        assert!(err.source().is_some());
    }
}
