//! Graph construction with eager validation.
//!
//! Every method instantiates its operator through the registry and runs the
//! `infer` rule immediately, so configuration, type, and shape errors
//! surface while the graph is being built. The builder also remembers the
//! `TableSpec` declared by each handle-producing node and rejects an
//! operator whose declared spec disagrees with its table input.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use kvgraph_core::error::{Error, Result};
use kvgraph_core::id::NodeId;
use kvgraph_core::value::{Tensor, TensorMeta};
use kvgraph_io::TextSource;
use kvgraph_ops::create::{TableCreate, TABLE_CREATE};
use kvgraph_ops::find::{TableFind, TABLE_FIND};
use kvgraph_ops::import::{TableImport, TABLE_IMPORT};
use kvgraph_ops::import_text::{TableImportText, TABLE_IMPORT_TEXT};
use kvgraph_ops::leaf::{Const, Input, CONST, INPUT};
use kvgraph_ops::Registry;
use kvgraph_table::TableSpec;

use crate::node::{Node, OperatorBinding};
use crate::program::Program;

fn encode<T: Serialize>(key: &str, config: &T) -> Result<Value> {
    serde_json::to_value(config)
        .map_err(|e| Error::Invariant(format!("encode '{key}' config: {e}")))
}

pub struct GraphBuilder {
    registry: Registry,
    nodes: Vec<Node>,
    /// Declared spec for every node known to emit a table handle.
    table_specs: HashMap<NodeId, TableSpec>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            nodes: Vec::new(),
            table_specs: HashMap::new(),
        }
    }

    fn push(&mut self, key: &str, config: Value, inputs: Vec<NodeId>) -> Result<NodeId> {
        let op = self.registry.make(key, &config)?;
        if op.arity() != inputs.len() {
            return Err(Error::Configuration(format!(
                "'{key}' takes {} inputs, got {}",
                op.arity(),
                inputs.len()
            )));
        }
        let mut metas = Vec::with_capacity(inputs.len());
        for id in &inputs {
            let node = self
                .nodes
                .get(id.get() as usize)
                .ok_or_else(|| Error::Configuration(format!("unknown input node {id}")))?;
            metas.push(node.meta.clone());
        }
        let meta = op.infer(&metas)?;
        let id = NodeId::new(self.nodes.len() as u64);
        self.nodes.push(Node {
            id,
            binding: OperatorBinding::new(key, config),
            inputs,
            meta,
        });
        Ok(id)
    }

    /// Check an operator's declared spec against what its table input is
    /// known to hold. A feed-supplied handle has no build-time spec; that
    /// case is caught when the kernel resolves the handle.
    fn check_declared_spec(&self, table: NodeId, declared: &TableSpec, key: &str) -> Result<()> {
        if let Some(known) = self.table_specs.get(&table) {
            if known != declared {
                return Err(Error::Configuration(format!(
                    "'{key}' declares ({}, {}) but its table input was created as ({}, {})",
                    declared.key_type, declared.value_type, known.key_type, known.value_type
                )));
            }
        }
        Ok(())
    }

    /// Named placeholder bound from caller feeds at run time.
    pub fn input(&mut self, name: &str, meta: TensorMeta) -> Result<NodeId> {
        let config = encode(INPUT, &Input::new(name, meta))?;
        self.push(INPUT, config, vec![])
    }

    /// Tensor embedded in the graph.
    pub fn constant(&mut self, value: Tensor) -> Result<NodeId> {
        let config = encode(CONST, &Const::new(value))?;
        self.push(CONST, config, vec![])
    }

    /// Create node: emits the handle of a fresh, empty table.
    pub fn create_table(&mut self, spec: TableSpec) -> Result<NodeId> {
        let config = encode(TABLE_CREATE, &TableCreate::new(spec))?;
        let id = self.push(TABLE_CREATE, config, vec![])?;
        self.table_specs.insert(id, spec);
        Ok(id)
    }

    /// Bulk-import node; the returned id is the post-mutation handle and is
    /// the input every later operator on this table must use.
    pub fn import_pairs(
        &mut self,
        table: NodeId,
        keys: NodeId,
        values: NodeId,
        spec: TableSpec,
    ) -> Result<NodeId> {
        self.check_declared_spec(table, &spec, TABLE_IMPORT)?;
        let config = encode(TABLE_IMPORT, &TableImport::new(spec))?;
        let id = self.push(TABLE_IMPORT, config, vec![table, keys, values])?;
        self.table_specs.insert(id, spec);
        Ok(id)
    }

    /// Text-import node; source misconfigurations fail here, not at run.
    pub fn import_text(
        &mut self,
        table: NodeId,
        source: TextSource,
        spec: TableSpec,
    ) -> Result<NodeId> {
        self.check_declared_spec(table, &spec, TABLE_IMPORT_TEXT)?;
        let config = encode(TABLE_IMPORT_TEXT, &TableImportText::new(spec, source)?)?;
        let id = self.push(TABLE_IMPORT_TEXT, config, vec![table])?;
        self.table_specs.insert(id, spec);
        Ok(id)
    }

    /// Lookup node: output shape mirrors the key input's shape.
    pub fn find(
        &mut self,
        table: NodeId,
        keys: NodeId,
        default: NodeId,
        spec: TableSpec,
    ) -> Result<NodeId> {
        self.check_declared_spec(table, &spec, TABLE_FIND)?;
        let config = encode(TABLE_FIND, &TableFind::new(spec))?;
        self.push(TABLE_FIND, config, vec![table, keys, default])
    }

    pub fn meta(&self, id: NodeId) -> Option<&TensorMeta> {
        self.nodes.get(id.get() as usize).map(|n| &n.meta)
    }

    /// Finish construction. Append order is already topological: every
    /// node's inputs predate it.
    pub fn build(self) -> Program {
        Program::new(self.nodes)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
