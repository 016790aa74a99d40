//! Schema registry for FlatDB
//!
//! The registry is the source of truth for table layouts. Every successful
//! definition overwrites a whole-registry JSON snapshot on disk; the snapshot
//! is read back once at startup.

use super::schema::{ColumnDef, TableSchema};
use super::types::ColumnType;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Registry of all known table schemas
pub struct Registry {
    /// Schemas by table name
    schemas: HashMap<String, TableSchema>,
    /// Location of the JSON snapshot
    snapshot_path: PathBuf,
}

impl Registry {
    /// Open a registry backed by a snapshot file, loading the last persisted
    /// snapshot if one exists. A missing snapshot means an empty registry; a
    /// corrupt one is reported and ignored.
    pub fn open(snapshot_path: impl AsRef<Path>) -> Self {
        let snapshot_path = snapshot_path.as_ref().to_path_buf();
        let schemas = match std::fs::read_to_string(&snapshot_path) {
            Ok(json) => match serde_json::from_str::<RegistrySnapshot>(&json) {
                Ok(snapshot) => snapshot
                    .tables
                    .into_iter()
                    .map(|t| (t.table_name.clone(), t))
                    .collect(),
                Err(e) => {
                    warn!(
                        "schema snapshot {} is corrupt, starting empty: {}",
                        snapshot_path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(
                    "could not read schema snapshot {}, starting empty: {}",
                    snapshot_path.display(),
                    e
                );
                HashMap::new()
            }
        };

        Self {
            schemas,
            snapshot_path,
        }
    }

    /// Define a new table. Column types are given as textual tokens
    /// (`INT`, `TEXT(n)`). On success the full registry snapshot is
    /// persisted before returning.
    pub fn define(&mut self, table_name: &str, columns: &[(String, String)]) -> Result<()> {
        if self.schemas.contains_key(table_name) {
            return Err(Error::DuplicateTable(table_name.to_string()));
        }

        let mut defs = Vec::with_capacity(columns.len());
        for (name, type_token) in columns {
            defs.push(ColumnDef::new(name.clone(), ColumnType::parse(type_token)?));
        }

        let schema = TableSchema::new(table_name, defs)?;
        self.schemas.insert(table_name.to_string(), schema);
        self.save_snapshot()
    }

    /// Get a table schema by name
    pub fn lookup(&self, table_name: &str) -> Option<&TableSchema> {
        self.schemas.get(table_name)
    }

    /// All known table names. Iteration order is unspecified.
    pub fn list(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }

    /// Overwrite the snapshot with the entire registry
    fn save_snapshot(&self) -> Result<()> {
        let snapshot = RegistrySnapshot {
            tables: self.schemas.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| Error::SnapshotCorrupt(e.to_string()))?;
        std::fs::write(&self.snapshot_path, json)?;
        Ok(())
    }
}

/// Serializable proxy for Registry
#[derive(serde::Serialize, serde::Deserialize)]
struct RegistrySnapshot {
    tables: Vec<TableSchema>,
}
