//! Runtime configuration shared by the engine and the table arena.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Optional initial-capacity hint applied to freshly created tables.
    /// Tables still grow past the hint; this only pre-sizes the map.
    pub table_capacity_hint: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            table_capacity_hint: None,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `KVGRAPH_TABLE_CAPACITY_HINT`: initial per-table capacity hint
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("KVGRAPH_TABLE_CAPACITY_HINT") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.table_capacity_hint = Some(v);
            }
        }

        cfg
    }
}
