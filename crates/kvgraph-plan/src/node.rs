//! Graph nodes and operator bindings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use kvgraph_core::id::NodeId;
use kvgraph_core::value::TensorMeta;

/// Minimal binding the engine needs to instantiate an operator: a stable
/// registry key and a JSON config payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorBinding {
    pub key: String,
    pub config: Value,
}

impl OperatorBinding {
    pub fn new(key: impl Into<String>, config: Value) -> Self {
        Self {
            key: key.into(),
            config,
        }
    }
}

/// One graph node: its binding, inputs by id, and the inferred output meta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub binding: OperatorBinding,
    pub inputs: Vec<NodeId>,
    pub meta: TensorMeta,
}
