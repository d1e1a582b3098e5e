//! Batched lookup: read-only probe of a fully-populated table.

use serde::{Deserialize, Serialize};

use kvgraph_core::error::{Error, Result};
use kvgraph_core::value::{Tensor, TensorMeta};
use kvgraph_table::{TableArena, TableSpec};

use crate::traits::{check_arity, expect_handle_meta, resolve_declared, Operator};

pub const TABLE_FIND: &str = "table.find";

/// Inputs: `[handle, keys, default]`. Output shape mirrors the key shape;
/// absent keys yield the default. Never mutates the table, so any number of
/// finds on the same handle may run concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFind {
    /// Declared key/value types; must agree with the table behind the handle.
    pub spec: TableSpec,
}

impl TableFind {
    pub fn new(spec: TableSpec) -> Self {
        Self { spec }
    }
}

impl Operator for TableFind {
    fn name(&self) -> &'static str {
        TABLE_FIND
    }

    fn arity(&self) -> usize {
        3
    }

    fn infer(&self, inputs: &[TensorMeta]) -> Result<TensorMeta> {
        check_arity(TABLE_FIND, 3, inputs)?;
        expect_handle_meta(TABLE_FIND, &inputs[0])?;
        let (keys, default) = (&inputs[1], &inputs[2]);
        if keys.dtype != self.spec.key_type {
            return Err(Error::TypeMismatch(format!(
                "{TABLE_FIND}: query keys are {}, declared key type is {}",
                keys.dtype, self.spec.key_type
            )));
        }
        if default.dtype != self.spec.value_type {
            return Err(Error::TypeMismatch(format!(
                "{TABLE_FIND}: default value is {}, declared value type is {}",
                default.dtype, self.spec.value_type
            )));
        }
        if default.num_elements() != 1 {
            return Err(Error::ShapeMismatch(format!(
                "{TABLE_FIND}: default value must be a single element, got shape {:?}",
                default.shape
            )));
        }
        Ok(TensorMeta::new(self.spec.value_type, keys.shape.clone()))
    }

    fn eval(&self, inputs: &[Tensor], arena: &TableArena) -> Result<Tensor> {
        check_arity(TABLE_FIND, 3, inputs)?;
        let table = resolve_declared(TABLE_FIND, arena, &inputs[0], &self.spec)?;
        let default = inputs[2].as_scalar()?;
        table.find(&inputs[1], default)
    }
}
