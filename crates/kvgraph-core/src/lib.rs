#![forbid(unsafe_code)]
//! kvgraph-core: ids, element types, tensor values, errors, hashing, and
//! configuration for the kvgraph table-operator runtime.
//!
//! No I/O and no async here; the resource, operator, and execution crates
//! build on these types.

pub mod config;
pub mod dtype;
pub mod error;
pub mod hash;
pub mod id;
pub mod manifest;
pub mod prelude;
pub mod value;

/// Engine version for provenance (mirrored into run manifests).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
