//! # Collaborator Traits
//!
//! The warden never evaluates a rule itself. It asks a [`RuleEvaluator`]
//! whether a value satisfies a named rule, and asks a
//! [`SanitizeTransforms`] implementation to rewrite a value. Both traits
//! require `Send + Sync` so a registry can be built once and shared.

use warden_core::{Node, RuleError};

use crate::options::RuleOptions;

/// Evaluates named validation rules and declared type names.
pub trait RuleEvaluator: Send + Sync {
    /// Evaluate `rule` against `value`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownRule`] for an unregistered rule and
    /// [`RuleError::InvalidOptions`] when the options cannot be used.
    fn evaluate(&self, rule: &str, value: &Node, options: &RuleOptions) -> Result<bool, RuleError>;

    /// True if `name` is a type name the evaluator understands.
    fn recognized_type_name(&self, name: &str) -> bool;

    /// True if `value` satisfies the type `type_name`.
    fn value_matches_type(&self, value: &Node, type_name: &str) -> bool;
}

/// Applies named sanitize transforms.
pub trait SanitizeTransforms: Send + Sync {
    /// True if a transform is registered under `name`.
    fn has_transform(&self, name: &str) -> bool;

    /// Return the transformed value.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownTransform`] for an unregistered name.
    fn apply_transform(
        &self,
        name: &str,
        value: &Node,
        options: &RuleOptions,
    ) -> Result<Node, RuleError>;
}
