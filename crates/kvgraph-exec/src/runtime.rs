//! Runtime: execute a `Program` in dependency order and emit a RunManifest.
//!
//! Behavior:
//! - Instantiates operators via the `kvgraph-ops` registry from node
//!   bindings.
//! - Special-cases `input` nodes, binding them from caller feeds after a
//!   meta check.
//! - Walks nodes in program order; every data dependency — the handle edge
//!   out of each mutator included — is satisfied before a node runs.
//! - The first operator failure aborts the run; dependents never execute.
//! - Emits a `RunManifest` with a stable program hash.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use kvgraph_core::config::EngineConfig;
use kvgraph_core::error::Error as CoreError;
use kvgraph_core::hash::hash_serde;
use kvgraph_core::id::NodeId;
use kvgraph_core::manifest::RunManifest;
use kvgraph_core::value::Tensor;
use kvgraph_ops::leaf::{Input, INPUT};
use kvgraph_ops::Registry;
use kvgraph_plan::{Node, Program};
use kvgraph_table::TableArena;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("operator registry: {0}")]
    Registry(String),
    #[error("operator exec: {0}")]
    Operator(#[from] CoreError),
    #[error("invalid program: {0}")]
    Invalid(String),
    #[error("hashing error: {0}")]
    Hash(String),
}

/// Fetched tensors (in fetch order) plus the run manifest.
#[derive(Debug)]
pub struct RunOutput {
    pub tensors: Vec<Tensor>,
    pub manifest: RunManifest,
}

/// Engine owns the operator registry and the table arena for one session.
/// Tables created by a run stay alive until the engine is dropped.
pub struct Engine {
    cfg: EngineConfig,
    registry: Registry,
    arena: Arc<TableArena>,
}

impl Engine {
    pub fn new(cfg: EngineConfig) -> Self {
        let arena = Arc::new(TableArena::with_capacity_hint(cfg.table_capacity_hint));
        Self {
            cfg,
            registry: Registry::new(),
            arena,
        }
    }

    /// The session's table arena; tests inspect live tables through this.
    pub fn arena(&self) -> Arc<TableArena> {
        Arc::clone(&self.arena)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Execute `program`, binding `feeds` to its input nodes, and fetch the
    /// listed node outputs.
    pub fn run(
        &self,
        program: &Program,
        feeds: &HashMap<String, Tensor>,
        fetch: &[NodeId],
    ) -> Result<RunOutput, ExecError> {
        let plan_hash = hash_serde(program).map_err(|e| ExecError::Hash(e.to_string()))?;
        let manifest = RunManifest::new(plan_hash, now_millis());

        let mut results: HashMap<NodeId, Tensor> = HashMap::with_capacity(program.len());

        for node in program.nodes() {
            let out = if node.binding.key == INPUT {
                self.bind_input(node, feeds)?
            } else {
                let op = self
                    .registry
                    .make(&node.binding.key, &node.binding.config)
                    .map_err(|e| ExecError::Registry(e.to_string()))?;

                // A result may feed several consumers (a populated handle
                // fans out to every lookup), so clone rather than consume.
                let mut inputs = Vec::with_capacity(node.inputs.len());
                for dep in &node.inputs {
                    let t = results.get(dep).cloned().ok_or_else(|| {
                        ExecError::Invalid(format!("missing dependency result for {dep}"))
                    })?;
                    inputs.push(t);
                }

                op.eval(&inputs, &self.arena)?
            };

            #[cfg(feature = "tracing")]
            tracing::trace!(node = %node.id, op = %node.binding.key, deps = node.inputs.len(), "executed node");

            results.insert(node.id, out);
        }

        let mut tensors = Vec::with_capacity(fetch.len());
        for id in fetch {
            let t = results
                .get(id)
                .cloned()
                .ok_or_else(|| ExecError::Invalid(format!("fetch of unknown node {id}")))?;
            tensors.push(t);
        }

        Ok(RunOutput {
            tensors,
            manifest: manifest.finish(now_millis()),
        })
    }

    fn bind_input(
        &self,
        node: &Node,
        feeds: &HashMap<String, Tensor>,
    ) -> Result<Tensor, ExecError> {
        let decl: Input = serde_json::from_value(node.binding.config.clone())
            .map_err(|e| ExecError::Invalid(format!("input node {}: {e}", node.id)))?;
        let fed = feeds
            .get(&decl.name)
            .ok_or_else(|| ExecError::Invalid(format!("no feed bound for input '{}'", decl.name)))?;
        if fed.dtype() != decl.meta.dtype {
            return Err(ExecError::Operator(CoreError::TypeMismatch(format!(
                "feed '{}' is {}, input declares {}",
                decl.name,
                fed.dtype(),
                decl.meta.dtype
            ))));
        }
        if fed.shape() != decl.meta.shape.as_slice() {
            return Err(ExecError::Operator(CoreError::ShapeMismatch(format!(
                "feed '{}' has shape {:?}, input declares {:?}",
                decl.name,
                fed.shape(),
                decl.meta.shape
            ))));
        }
        Ok(fed.clone())
    }
}

// --- helpers ---

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
