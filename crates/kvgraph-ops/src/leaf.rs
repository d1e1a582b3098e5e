//! Leaf operators: embedded constants and runtime-fed placeholders.

use serde::{Deserialize, Serialize};

use kvgraph_core::error::{Error, Result};
use kvgraph_core::value::{Tensor, TensorMeta};
use kvgraph_table::TableArena;

use crate::traits::{check_arity, Operator};

pub const CONST: &str = "const";
pub const INPUT: &str = "input";

/// A tensor embedded in the graph itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Const {
    pub value: Tensor,
}

impl Const {
    pub fn new(value: Tensor) -> Self {
        Self { value }
    }
}

impl Operator for Const {
    fn name(&self) -> &'static str {
        CONST
    }

    fn arity(&self) -> usize {
        0
    }

    fn infer(&self, inputs: &[TensorMeta]) -> Result<TensorMeta> {
        check_arity(CONST, 0, inputs)?;
        Ok(self.value.meta())
    }

    fn eval(&self, inputs: &[Tensor], _arena: &TableArena) -> Result<Tensor> {
        check_arity(CONST, 0, inputs)?;
        Ok(self.value.clone())
    }
}

/// A named placeholder bound from caller-supplied feeds at run time. The
/// engine substitutes the feed (checked against `meta`) before dispatch;
/// `eval` is never reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
    pub name: String,
    pub meta: TensorMeta,
}

impl Input {
    pub fn new(name: impl Into<String>, meta: TensorMeta) -> Self {
        Self {
            name: name.into(),
            meta,
        }
    }
}

impl Operator for Input {
    fn name(&self) -> &'static str {
        INPUT
    }

    fn arity(&self) -> usize {
        0
    }

    fn infer(&self, inputs: &[TensorMeta]) -> Result<TensorMeta> {
        check_arity(INPUT, 0, inputs)?;
        Ok(self.meta.clone())
    }

    fn eval(&self, _inputs: &[Tensor], _arena: &TableArena) -> Result<Tensor> {
        Err(Error::Invariant(format!(
            "input '{}' must be bound by the engine, not evaluated",
            self.name
        )))
    }
}
