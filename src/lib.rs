#![forbid(unsafe_code)]
//! kvgraph: a lookup-table resource extension for a dataflow graph runtime.
//!
//! Umbrella re-exports over the workspace crates; the integration tests in
//! `tests/` exercise the protocol through this surface.

pub use kvgraph_core::prelude::*;
pub use kvgraph_exec::{Engine, ExecError, RunOutput};
pub use kvgraph_io::{read_pairs, KeyColumn, TextSource, ValueColumn};
pub use kvgraph_ops::{Operator, Registry};
pub use kvgraph_plan::{GraphBuilder, Node, OperatorBinding, Program};
pub use kvgraph_table::{Table, TableArena, TableSpec};
