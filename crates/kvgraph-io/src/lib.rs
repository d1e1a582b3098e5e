#![forbid(unsafe_code)]
//! kvgraph-io: text-import sources for table initialization.
//!
//! One concern: turn "files + delimiter + column selectors" into parsed
//! (key, value) scalar pairs, with typed errors carrying file/line context.
//! The table and operator crates decide what to do with the pairs.

pub mod text;

pub use text::{read_pairs, KeyColumn, TextSource, ValueColumn};
