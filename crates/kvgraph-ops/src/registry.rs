//! String-keyed operator registry.
//!
//! The plan layer stores `(key, config)` bindings; the graph builder and the
//! engine instantiate operators through this registry. Configs are decoded
//! from JSON and re-validated, so a deserialized program cannot smuggle in a
//! spec that the typed constructors would have rejected.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use kvgraph_core::dtype::ElementType;
use kvgraph_core::error::{Error, Result};
use kvgraph_table::TableSpec;

use crate::create::{TableCreate, TABLE_CREATE};
use crate::find::{TableFind, TABLE_FIND};
use crate::import::{TableImport, TABLE_IMPORT};
use crate::import_text::{TableImportText, TABLE_IMPORT_TEXT};
use crate::leaf::{Const, Input, CONST, INPUT};
use crate::traits::Operator;

type Maker = fn(&Value) -> Result<Box<dyn Operator>>;

static MAKERS: Lazy<HashMap<&'static str, Maker>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Maker> = HashMap::new();
    m.insert(TABLE_CREATE, make_create);
    m.insert(TABLE_IMPORT, make_import);
    m.insert(TABLE_IMPORT_TEXT, make_import_text);
    m.insert(TABLE_FIND, make_find);
    m.insert(CONST, make_const);
    m.insert(INPUT, make_input);
    m
});

fn decode<T: serde::de::DeserializeOwned>(key: &str, config: &Value) -> Result<T> {
    serde_json::from_value(config.clone())
        .map_err(|e| Error::Configuration(format!("bad config for '{key}': {e}")))
}

fn revalidate(spec: TableSpec) -> Result<TableSpec> {
    TableSpec::new(spec.key_type, spec.value_type)
}

fn make_create(config: &Value) -> Result<Box<dyn Operator>> {
    let op: TableCreate = decode(TABLE_CREATE, config)?;
    if op.dtype != ElementType::TableHandle {
        return Err(Error::Configuration(format!(
            "'{TABLE_CREATE}' output dtype must be table_handle, got {}",
            op.dtype
        )));
    }
    Ok(Box::new(TableCreate::new(revalidate(op.spec)?)))
}

fn make_import(config: &Value) -> Result<Box<dyn Operator>> {
    let op: TableImport = decode(TABLE_IMPORT, config)?;
    Ok(Box::new(TableImport::new(revalidate(op.spec)?)))
}

fn make_import_text(config: &Value) -> Result<Box<dyn Operator>> {
    let op: TableImportText = decode(TABLE_IMPORT_TEXT, config)?;
    Ok(Box::new(TableImportText::new(
        revalidate(op.spec)?,
        op.source,
    )?))
}

fn make_find(config: &Value) -> Result<Box<dyn Operator>> {
    let op: TableFind = decode(TABLE_FIND, config)?;
    Ok(Box::new(TableFind::new(revalidate(op.spec)?)))
}

fn make_const(config: &Value) -> Result<Box<dyn Operator>> {
    let op: Const = decode(CONST, config)?;
    Ok(Box::new(op))
}

fn make_input(config: &Value) -> Result<Box<dyn Operator>> {
    let op: Input = decode(INPUT, config)?;
    Ok(Box::new(op))
}

pub struct Registry {
    makers: &'static HashMap<&'static str, Maker>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            makers: Lazy::force(&MAKERS),
        }
    }

    /// Instantiate the operator registered under `key`.
    pub fn make(&self, key: &str, config: &Value) -> Result<Box<dyn Operator>> {
        let maker = self
            .makers
            .get(key)
            .ok_or_else(|| Error::Configuration(format!("unknown operator key '{key}'")))?;
        maker(config)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
