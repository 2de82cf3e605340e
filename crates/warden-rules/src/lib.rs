//! # warden-rules — Rule Collaborators
//!
//! The warden delegates every rule decision to two traits defined here:
//! [`RuleEvaluator`] for validation rules and type names, and
//! [`SanitizeTransforms`] for in-place rewrites. [`RuleRegistry`] implements
//! both and can be extended with custom rules; [`RuleRegistry::standard`]
//! provides a default set.
//!
//! ## Crate Policy
//!
//! - Registries are explicit values. There is no global registration.
//! - Standard transforms are idempotent.

pub mod options;
pub mod registry;
pub mod traits;
pub mod types;

pub use options::{as_number, RuleOptions, DEFAULT_FORMAT};
pub use registry::{Predicate, RuleRegistry, Transform};
pub use traits::{RuleEvaluator, SanitizeTransforms};
pub use types::{parse_bool, TypeName};
