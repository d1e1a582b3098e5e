//! Text-file import: consume a handle, parse the configured source, mutate
//! the table, and re-emit the handle.

use serde::{Deserialize, Serialize};

use kvgraph_core::error::Result;
use kvgraph_core::value::{Tensor, TensorMeta};
use kvgraph_io::{read_pairs, TextSource};
use kvgraph_table::{TableArena, TableSpec};

use crate::traits::{check_arity, expect_handle_meta, resolve_declared, Operator};

pub const TABLE_IMPORT_TEXT: &str = "table.import_text";

/// Inputs: `[handle]`; the file list, column selectors, delimiter, and
/// vocabulary bound all ride in the config. Output: a handle postdating the
/// full import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableImportText {
    pub spec: TableSpec,
    pub source: TextSource,
}

impl TableImportText {
    /// Validates the source against the declared types, so selector and
    /// delimiter misconfigurations fail at graph build.
    pub fn new(spec: TableSpec, source: TextSource) -> Result<Self> {
        source.validate(spec.value_type)?;
        Ok(Self { spec, source })
    }
}

impl Operator for TableImportText {
    fn name(&self) -> &'static str {
        TABLE_IMPORT_TEXT
    }

    fn arity(&self) -> usize {
        1
    }

    fn infer(&self, inputs: &[TensorMeta]) -> Result<TensorMeta> {
        check_arity(TABLE_IMPORT_TEXT, 1, inputs)?;
        expect_handle_meta(TABLE_IMPORT_TEXT, &inputs[0])?;
        Ok(TensorMeta::handle())
    }

    fn eval(&self, inputs: &[Tensor], arena: &TableArena) -> Result<Tensor> {
        check_arity(TABLE_IMPORT_TEXT, 1, inputs)?;
        let table = resolve_declared(TABLE_IMPORT_TEXT, arena, &inputs[0], &self.spec)?;
        // parse everything first; a malformed line aborts before any insert
        let pairs = read_pairs(&self.source, self.spec.key_type, self.spec.value_type)?;
        table.import_pairs(&pairs)?;
        Ok(Tensor::handle(inputs[0].as_handle()?))
    }
}
