#![forbid(unsafe_code)]
//! kvgraph-ops: the table operators and their registry.
//!
//! Design intent:
//! - One seam per operator: stable name, arity, `infer` type rule, `eval`
//!   kernel. The graph builder runs `infer` at build time; the engine runs
//!   `eval`.
//! - Mutators re-emit their handle input as output. Ordering between
//!   mutation and reads is carried entirely by that dependency edge; the
//!   scheduler needs no effect tracking.

pub mod create;
pub mod find;
pub mod import;
pub mod import_text;
pub mod leaf;
pub mod registry;
pub mod traits;

pub use registry::Registry;
pub use traits::Operator;
