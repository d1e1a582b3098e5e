//! Table storage: declared spec, staged batch import, batched probe.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use kvgraph_core::dtype::ElementType;
use kvgraph_core::error::{Error, Result};
use kvgraph_core::value::{Scalar, Tensor};

/// Declared key/value element types, fixed at creation for the table's
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub key_type: ElementType,
    pub value_type: ElementType,
}

impl TableSpec {
    /// Validate and build a spec. Float keys have no well-defined hashing and
    /// are rejected here, before any graph node exists.
    pub fn new(key_type: ElementType, value_type: ElementType) -> Result<Self> {
        if !key_type.is_key_kind() {
            return Err(Error::Configuration(format!(
                "unsupported key type {key_type}; table keys must be int64 or utf8"
            )));
        }
        if !value_type.is_value_kind() {
            return Err(Error::Configuration(format!(
                "unsupported value type {value_type}"
            )));
        }
        Ok(Self {
            key_type,
            value_type,
        })
    }
}

/// Internal key representation. Only element kinds with total equality reach
/// this enum; `TableSpec::new` already rejected the rest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TableKey {
    I64(i64),
    Text(String),
}

impl TableKey {
    fn from_scalar(scalar: &Scalar, expected: ElementType) -> Result<Self> {
        if scalar.element_type() != expected {
            return Err(Error::TypeMismatch(format!(
                "key element is {}, table declares {}",
                scalar.element_type(),
                expected
            )));
        }
        match scalar {
            Scalar::I64(v) => Ok(TableKey::I64(*v)),
            Scalar::Str(v) => Ok(TableKey::Text(v.clone())),
            other => Err(Error::Invariant(format!(
                "non-hashable key kind {} reached storage",
                other.element_type()
            ))),
        }
    }
}

/// The runtime resource a `TableHandle` designates.
///
/// Entry order is irrelevant; duplicate keys resolve last-write-wins in
/// input order.
pub struct Table {
    spec: TableSpec,
    map: RwLock<HashMap<TableKey, Scalar>>,
}

impl Table {
    pub fn new(spec: TableSpec) -> Self {
        Self {
            spec,
            map: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_capacity(spec: TableSpec, capacity: usize) -> Self {
        Self {
            spec,
            map: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    pub fn spec(&self) -> TableSpec {
        self.spec
    }

    pub fn len(&self) -> usize {
        self.map.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bulk import from parallel key/value tensors.
    ///
    /// Every pair is validated and staged before the write lock is taken, so
    /// a failed import leaves the table unchanged. Returns the number of
    /// pairs applied.
    pub fn import(&self, keys: &Tensor, values: &Tensor) -> Result<usize> {
        if keys.shape() != values.shape() {
            return Err(Error::ShapeMismatch(format!(
                "keys shape {:?} does not match values shape {:?}",
                keys.shape(),
                values.shape()
            )));
        }
        if values.dtype() != self.spec.value_type {
            return Err(Error::TypeMismatch(format!(
                "values are {}, table declares {}",
                values.dtype(),
                self.spec.value_type
            )));
        }
        let staged: Vec<(TableKey, Scalar)> = keys
            .values()
            .iter()
            .zip(values.values())
            .map(|(k, v)| Ok((TableKey::from_scalar(k, self.spec.key_type)?, v.clone())))
            .collect::<Result<_>>()?;
        Ok(self.commit(staged))
    }

    /// Import pre-parsed pairs (the text-initializer path). Same staging and
    /// overwrite rules as `import`.
    pub fn import_pairs(&self, pairs: &[(Scalar, Scalar)]) -> Result<usize> {
        let mut staged = Vec::with_capacity(pairs.len());
        for (k, v) in pairs {
            if v.element_type() != self.spec.value_type {
                return Err(Error::TypeMismatch(format!(
                    "value element is {}, table declares {}",
                    v.element_type(),
                    self.spec.value_type
                )));
            }
            staged.push((TableKey::from_scalar(k, self.spec.key_type)?, v.clone()));
        }
        Ok(self.commit(staged))
    }

    fn commit(&self, staged: Vec<(TableKey, Scalar)>) -> usize {
        let count = staged.len();
        let mut map = self.map.write().unwrap();
        for (k, v) in staged {
            // last write wins on duplicate keys
            map.insert(k, v);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(applied = count, entries = map.len(), "table import committed");
        count
    }

    /// Batched read-only probe: one output element per query key, the default
    /// for absent keys. Output shape mirrors the query shape.
    pub fn find(&self, keys: &Tensor, default: &Scalar) -> Result<Tensor> {
        if keys.dtype() != self.spec.key_type {
            return Err(Error::TypeMismatch(format!(
                "query keys are {}, table declares {}",
                keys.dtype(),
                self.spec.key_type
            )));
        }
        if default.element_type() != self.spec.value_type {
            return Err(Error::TypeMismatch(format!(
                "default value is {}, table declares {}",
                default.element_type(),
                self.spec.value_type
            )));
        }
        let map = self.map.read().unwrap();
        let mut out = Vec::with_capacity(keys.len());
        for k in keys.values() {
            let key = TableKey::from_scalar(k, self.spec.key_type)?;
            out.push(map.get(&key).cloned().unwrap_or_else(|| default.clone()));
        }
        drop(map);
        Tensor::new(self.spec.value_type, keys.shape().to_vec(), out)
    }
}
