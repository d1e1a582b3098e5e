//! Table creation: allocate a fresh, empty table and emit its handle.

use serde::{Deserialize, Serialize};

use kvgraph_core::dtype::ElementType;
use kvgraph_core::error::{Error, Result};
use kvgraph_core::value::{Tensor, TensorMeta};
use kvgraph_table::{TableArena, TableSpec};

use crate::traits::{check_arity, Operator};

pub const TABLE_CREATE: &str = "table.create";

/// No tensor inputs; the declared element types ride in the config.
/// `TableSpec::new` has already vetted the key/value types by the time this
/// exists; the declared output dtype must be the handle tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCreate {
    pub spec: TableSpec,
    /// Declared dtype of the emitted tensor.
    pub dtype: ElementType,
}

impl TableCreate {
    pub fn new(spec: TableSpec) -> Self {
        Self {
            spec,
            dtype: ElementType::TableHandle,
        }
    }
}

impl Operator for TableCreate {
    fn name(&self) -> &'static str {
        TABLE_CREATE
    }

    fn arity(&self) -> usize {
        0
    }

    fn infer(&self, inputs: &[TensorMeta]) -> Result<TensorMeta> {
        check_arity(TABLE_CREATE, 0, inputs)?;
        if self.dtype != ElementType::TableHandle {
            return Err(Error::Configuration(format!(
                "{TABLE_CREATE}: output dtype must be table_handle, got {}",
                self.dtype
            )));
        }
        Ok(TensorMeta::handle())
    }

    fn eval(&self, inputs: &[Tensor], arena: &TableArena) -> Result<Tensor> {
        check_arity(TABLE_CREATE, 0, inputs)?;
        // each invocation allocates a distinct slot; no aliasing
        let handle = arena.create(self.spec);
        Ok(Tensor::handle(handle))
    }
}
