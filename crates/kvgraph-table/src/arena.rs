//! Slot arena that owns every table in a runtime session.
//!
//! Handles carry the slot index rather than a raw native pointer; resolving
//! a handle is a bounds-checked lookup. Tables live until the arena is
//! dropped at session teardown — there is no destroy operator.

use std::sync::{Arc, RwLock};

use kvgraph_core::error::{Error, Result};
use kvgraph_core::id::TableId;
use kvgraph_core::value::TableHandle;

use crate::store::{Table, TableSpec};

pub struct TableArena {
    slots: RwLock<Vec<Arc<Table>>>,
    capacity_hint: Option<usize>,
}

impl TableArena {
    pub fn new() -> Self {
        Self::with_capacity_hint(None)
    }

    /// Arena whose tables pre-size their maps to `hint` entries.
    pub fn with_capacity_hint(hint: Option<usize>) -> Self {
        Self {
            slots: RwLock::new(Vec::new()),
            capacity_hint: hint,
        }
    }

    /// Allocate a fresh, empty table and hand back its handle. Every call
    /// yields a distinct slot; handles never alias across tables.
    pub fn create(&self, spec: TableSpec) -> TableHandle {
        let table = match self.capacity_hint {
            Some(cap) => Table::with_capacity(spec, cap),
            None => Table::new(spec),
        };
        let mut slots = self.slots.write().unwrap();
        let id = TableId::new(slots.len() as u64);
        slots.push(Arc::new(table));
        TableHandle::new(id)
    }

    /// Resolve a handle to its table. A dangling id is an internal invariant
    /// failure: handles are only ever minted by `create`.
    pub fn resolve(&self, handle: TableHandle) -> Result<Arc<Table>> {
        let slots = self.slots.read().unwrap();
        slots
            .get(handle.table_id().get() as usize)
            .cloned()
            .ok_or_else(|| Error::Invariant(format!("dangling table handle {handle}")))
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TableArena {
    fn default() -> Self {
        Self::new()
    }
}
