//! Convenient re-exports for downstream crates.

pub use crate::config::EngineConfig;
pub use crate::dtype::ElementType;
pub use crate::error::{Error, Result};
pub use crate::hash::{hash_serde, Hash256};
pub use crate::id::{NodeId, TableId};
pub use crate::manifest::{ManifestId, RunManifest};
pub use crate::value::{Scalar, TableHandle, Tensor, TensorMeta};
