//! # warden-schema — Schema Enforcement
//!
//! [`SchemaWarden`] applies path-keyed schemas to one data instance:
//!
//! - [`SchemaWarden::test_required`] — required paths are present.
//! - [`SchemaWarden::test_new_schema`] — the data holds no undeclared path.
//! - [`SchemaWarden::test_types`] — values match their declared type, after
//!   optional coercion.
//! - [`SchemaWarden::validate`] — named rules pass for every matched value.
//! - [`SchemaWarden::sanitize`] — named transforms rewrite matched values.
//!
//! [`SchemaDocument`] bundles all of these into one YAML or JSON file, and
//! [`SchemaWarden::run`] applies a whole document in order.
//!
//! ## Crate Policy
//!
//! - Rules and transforms come from collaborators passed in by the caller.
//! - Schema documents are a trust boundary: they are checked against the
//!   bundled JSON Schema before use.

pub mod document;
pub mod rules;
pub mod warden;

pub use document::{
    check_document, DocumentError, DocumentFormat, SchemaDocument, ValidationViolations, Violation,
};
pub use rules::{PathTable, RuleSchema, RuleSet, RuleSpec, TypeSchema, REQUIRED};
pub use warden::SchemaWarden;
