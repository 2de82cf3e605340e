//! # warden-query — Mapping and Querying Node Trees
//!
//! Two read-only engines over [`warden_core::Node`]:
//!
//! - [`map_paths`] infers the set of paths that describe a data instance.
//! - [`Query`] evaluates one compiled path and reports, per concrete path,
//!   whether it was a hit, undefined, or a soft type mismatch.
//!
//! Results are [`warden_core::NodePointer`]s, not borrows, so callers can
//! write through them once the query has finished.

pub mod inspection;
pub mod mapper;
pub mod query;

pub use inspection::{Inspection, PathStatus};
pub use mapper::{is_list_of_objects, is_list_of_primitives, map_paths};
pub use query::{Query, QueryMatch};
