//! Bulk import: consume a handle plus parallel key/value tensors, mutate the
//! table in place, and re-emit the handle once the mutation is complete.

use serde::{Deserialize, Serialize};

use kvgraph_core::error::{Error, Result};
use kvgraph_core::value::{Tensor, TensorMeta};
use kvgraph_table::{TableArena, TableSpec};

use crate::traits::{check_arity, expect_handle_meta, resolve_declared, Operator};

pub const TABLE_IMPORT: &str = "table.import";

/// Inputs: `[handle, keys, values]`. Output: a handle for the same table
/// that postdates the import — the dependency edge every later reader of
/// this table must consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableImport {
    /// Declared key/value types; must agree with the table behind the handle.
    pub spec: TableSpec,
}

impl TableImport {
    pub fn new(spec: TableSpec) -> Self {
        Self { spec }
    }
}

impl Operator for TableImport {
    fn name(&self) -> &'static str {
        TABLE_IMPORT
    }

    fn arity(&self) -> usize {
        3
    }

    fn infer(&self, inputs: &[TensorMeta]) -> Result<TensorMeta> {
        check_arity(TABLE_IMPORT, 3, inputs)?;
        expect_handle_meta(TABLE_IMPORT, &inputs[0])?;
        let (keys, values) = (&inputs[1], &inputs[2]);
        if keys.dtype != self.spec.key_type {
            return Err(Error::TypeMismatch(format!(
                "{TABLE_IMPORT}: keys are {}, declared key type is {}",
                keys.dtype, self.spec.key_type
            )));
        }
        if values.dtype != self.spec.value_type {
            return Err(Error::TypeMismatch(format!(
                "{TABLE_IMPORT}: values are {}, declared value type is {}",
                values.dtype, self.spec.value_type
            )));
        }
        if keys.shape != values.shape {
            return Err(Error::ShapeMismatch(format!(
                "{TABLE_IMPORT}: keys shape {:?} does not match values shape {:?}",
                keys.shape, values.shape
            )));
        }
        Ok(TensorMeta::handle())
    }

    fn eval(&self, inputs: &[Tensor], arena: &TableArena) -> Result<Tensor> {
        check_arity(TABLE_IMPORT, 3, inputs)?;
        let table = resolve_declared(TABLE_IMPORT, arena, &inputs[0], &self.spec)?;
        table.import(&inputs[1], &inputs[2])?;
        // emitted after the mutation completes
        Ok(Tensor::handle(inputs[0].as_handle()?))
    }
}
