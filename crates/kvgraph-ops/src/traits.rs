//! Operator trait: registration surface, type rule, and kernel in one seam.

use std::sync::Arc;

use kvgraph_core::dtype::ElementType;
use kvgraph_core::error::{Error, Result};
use kvgraph_core::value::{Tensor, TensorMeta};
use kvgraph_table::{Table, TableArena, TableSpec};

/// Trait all graph operators implement.
///
/// Invariants:
/// - `infer` is pure and runs at graph build; every statically detectable
///   type/shape violation must surface there, not in `eval`.
/// - `eval` must be deterministic given the same inputs and table state, and
///   runs to completion as one atomic unit of work from the scheduler's
///   point of view.
pub trait Operator: Send + Sync + 'static {
    /// Stable registry name.
    fn name(&self) -> &'static str;

    /// Number of tensor inputs.
    fn arity(&self) -> usize;

    /// Type/shape rule: given input metas, the output meta or a taxonomy
    /// error.
    fn infer(&self, inputs: &[TensorMeta]) -> Result<TensorMeta>;

    /// Execute on materialized inputs. Operators touching a table resolve
    /// their handle through `arena` after validating the tag.
    fn eval(&self, inputs: &[Tensor], arena: &TableArena) -> Result<Tensor>;
}

pub(crate) fn check_arity<T>(op: &str, arity: usize, inputs: &[T]) -> Result<()> {
    if inputs.len() != arity {
        return Err(Error::Invariant(format!(
            "{op}: expected {arity} inputs, got {}",
            inputs.len()
        )));
    }
    Ok(())
}

pub(crate) fn expect_handle_meta(op: &str, meta: &TensorMeta) -> Result<()> {
    if meta.dtype != ElementType::TableHandle {
        return Err(Error::TypeMismatch(format!(
            "{op}: input 0 must be a table handle, got {}",
            meta.dtype
        )));
    }
    Ok(())
}

/// Resolve a handle tensor and check the operator's declared spec against
/// the live table's spec. Declared attrs can disagree with the actual table
/// only when the handle arrived through a feed, so this stays a runtime
/// check.
pub(crate) fn resolve_declared(
    op: &str,
    arena: &TableArena,
    handle_tensor: &Tensor,
    declared: &TableSpec,
) -> Result<Arc<Table>> {
    let handle = handle_tensor.as_handle()?;
    let table = arena.resolve(handle)?;
    let actual = table.spec();
    if actual != *declared {
        return Err(Error::TypeMismatch(format!(
            "{op}: declared ({}, {}) but {handle} holds a ({}, {}) table",
            declared.key_type, declared.value_type, actual.key_type, actual.value_type
        )));
    }
    Ok(table)
}
