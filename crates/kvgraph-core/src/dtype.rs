//! The closed element-type universe for graph values.
//!
//! Element types form a closed tagged union rather than open string tags:
//! operators match on `ElementType` directly, and unsupported combinations
//! are unrepresentable. `TableHandle` is the resource tag; it is not a
//! key/value element kind, so numeric and text paths reject it by
//! construction.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Int64,
    Float64,
    Utf8,
    TableHandle,
}

impl ElementType {
    /// Element kinds with well-defined hashing and equality for table keys.
    /// Floats are excluded; declaring a float key is a configuration error.
    pub fn is_key_kind(self) -> bool {
        matches!(self, ElementType::Int64 | ElementType::Utf8)
    }

    /// Element kinds storable as table values.
    pub fn is_value_kind(self) -> bool {
        matches!(
            self,
            ElementType::Int64 | ElementType::Float64 | ElementType::Utf8
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementType::Int64 => "int64",
            ElementType::Float64 => "float64",
            ElementType::Utf8 => "utf8",
            ElementType::TableHandle => "table_handle",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
