//! # warden-core — Foundational Types for Schema Warden
//!
//! This crate is the leaf of the workspace. It defines the value model the
//! engine operates on, the compiled path type, and the error taxonomy.
//! Every other crate in the workspace depends on `warden-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **A closed value model.** [`Node`] has exactly four cases (`Null`,
//!    `Scalar`, `List`, `Map`). All recursive logic is an exhaustive match.
//!
//! 2. **Pointers, not borrows.** Query results are [`NodePointer`]s, so
//!    coercion and sanitization can write back through them after the
//!    traversal has finished.
//!
//! 3. **Paths are compiled once.** [`SchemaPath`] can only be built by the
//!    compiler, so every path held anywhere in the workspace is valid.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `warden-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod node;
pub mod path;
pub mod pointer;

// Re-export primary types for ergonomic imports.
pub use error::{
    qualified, ConversionError, PathSyntaxError, QueryError, RuleError, SchemaError,
};
pub use node::{is_integer_key, parse_integer_key, Node, Scalar, NULL};
pub use path::{test_path, SchemaPath, Segment, SeparatorKind};
pub use pointer::{NodePointer, Step};
