//! Scalar and tensor values flowing through the graph.
//!
//! A `Tensor` is the value the engine passes between operators: a dtype, a
//! shape, and flattened elements. Handle tensors are single-element and carry
//! the `TableHandle` resource tag, so a live table can ride the ordinary
//! value-dependency machinery without ever being mistaken for numeric data.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dtype::ElementType;
use crate::error::{Error, Result};
use crate::id::TableId;

/// Opaque reference to a live table slot in the runtime arena.
///
/// Equality means "designates the same table". A mutating operator re-emits a
/// handle with the same id; the re-emitted tensor is a distinct graph value
/// that postdates the mutation, which is exactly what dependency tracking
/// needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableHandle(TableId);

impl TableHandle {
    pub const fn new(id: TableId) -> Self {
        Self(id)
    }

    pub const fn table_id(self) -> TableId {
        self.0
    }
}

impl fmt::Display for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableHandle({})", self.0.get())
    }
}

/// One element of a tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    I64(i64),
    F64(f64),
    Str(String),
    Handle(TableHandle),
}

impl Scalar {
    pub fn element_type(&self) -> ElementType {
        match self {
            Scalar::I64(_) => ElementType::Int64,
            Scalar::F64(_) => ElementType::Float64,
            Scalar::Str(_) => ElementType::Utf8,
            Scalar::Handle(_) => ElementType::TableHandle,
        }
    }
}

/// Construction-time view of a tensor: dtype plus shape, no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorMeta {
    pub dtype: ElementType,
    pub shape: Vec<usize>,
}

impl TensorMeta {
    pub fn new(dtype: ElementType, shape: Vec<usize>) -> Self {
        Self { dtype, shape }
    }

    /// Meta of a handle tensor: the resource tag, one element.
    pub fn handle() -> Self {
        Self::new(ElementType::TableHandle, vec![1])
    }

    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }
}

/// A dense value: dtype, shape, and elements flattened in row-major order.
///
/// Construction validates that every element matches the dtype and that the
/// shape product equals the element count, so a well-typed tensor cannot be
/// built from mismatched parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    dtype: ElementType,
    shape: Vec<usize>,
    values: Vec<Scalar>,
}

impl Tensor {
    pub fn new(dtype: ElementType, shape: Vec<usize>, values: Vec<Scalar>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(Error::ShapeMismatch(format!(
                "shape {:?} implies {} elements, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| v.element_type() != dtype) {
            return Err(Error::TypeMismatch(format!(
                "tensor declared {} but holds a {} element",
                dtype,
                bad.element_type()
            )));
        }
        Ok(Self {
            dtype,
            shape,
            values,
        })
    }

    /// 1-D constructor; shape is the element count.
    pub fn from_values(dtype: ElementType, values: Vec<Scalar>) -> Result<Self> {
        let shape = vec![values.len()];
        Self::new(dtype, shape, values)
    }

    /// Single-element tensor of the scalar's own dtype, shape `[1]`.
    pub fn scalar(value: Scalar) -> Self {
        let dtype = value.element_type();
        Self {
            dtype,
            shape: vec![1],
            values: vec![value],
        }
    }

    /// Single-element handle tensor for `h`.
    pub fn handle(h: TableHandle) -> Self {
        Self::scalar(Scalar::Handle(h))
    }

    pub fn from_i64(values: impl IntoIterator<Item = i64>) -> Self {
        let values: Vec<Scalar> = values.into_iter().map(Scalar::I64).collect();
        Self {
            dtype: ElementType::Int64,
            shape: vec![values.len()],
            values,
        }
    }

    pub fn from_f64(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<Scalar> = values.into_iter().map(Scalar::F64).collect();
        Self {
            dtype: ElementType::Float64,
            shape: vec![values.len()],
            values,
        }
    }

    pub fn from_utf8<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        let values: Vec<Scalar> = values
            .into_iter()
            .map(|s| Scalar::Str(s.into()))
            .collect();
        Self {
            dtype: ElementType::Utf8,
            shape: vec![values.len()],
            values,
        }
    }

    pub fn dtype(&self) -> ElementType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn meta(&self) -> TensorMeta {
        TensorMeta::new(self.dtype, self.shape.clone())
    }

    /// Interpret this tensor as a table handle, validating the resource tag
    /// before anything dereferences it.
    pub fn as_handle(&self) -> Result<TableHandle> {
        if self.dtype != ElementType::TableHandle {
            return Err(Error::TypeMismatch(format!(
                "expected a table_handle tensor, got {}",
                self.dtype
            )));
        }
        match self.values.as_slice() {
            [Scalar::Handle(h)] => Ok(*h),
            _ => Err(Error::ShapeMismatch(
                "a handle tensor holds exactly one element".to_string(),
            )),
        }
    }

    /// Interpret a single-element tensor as its scalar (e.g. a lookup
    /// default value).
    pub fn as_scalar(&self) -> Result<&Scalar> {
        match self.values.as_slice() {
            [v] => Ok(v),
            _ => Err(Error::ShapeMismatch(format!(
                "expected a single-element tensor, got {} elements",
                self.values.len()
            ))),
        }
    }
}
