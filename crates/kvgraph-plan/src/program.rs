//! Executable program: validated nodes in dependency order.

use serde::{Deserialize, Serialize};

use kvgraph_core::id::NodeId;
use kvgraph_core::value::TensorMeta;

use crate::node::Node;

/// Node ids are dense indices into the node list, and every node's inputs
/// precede it, so walking the list front to back respects every data
/// dependency — including the handle edges that order mutation before reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    nodes: Vec<Node>,
}

impl Program {
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.get() as usize)
    }

    pub fn meta(&self, id: NodeId) -> Option<&TensorMeta> {
        self.node(id).map(|n| &n.meta)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
