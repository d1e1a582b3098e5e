#![forbid(unsafe_code)]
//! kvgraph-table: the mutable key→value resource behind table handles.
//!
//! Design intent:
//! - Tables are owned by the runtime's `TableArena`; the graph only ever
//!   holds `TableHandle` values.
//! - Mutation is staged, then committed under one write lock, so an aborted
//!   import leaves the table unchanged.
//! - Probes take the read lock only; concurrent lookups are safe once no
//!   mutator is pending on the same handle.

pub mod arena;
pub mod store;

pub use arena::TableArena;
pub use store::{Table, TableSpec};
