//! Table store for FlatDB
//!
//! Combines the per-table append-only data files with a lazily populated
//! in-memory row cache, and owns the schema registry. All six store
//! operations go through one `Store` value, so tests can run several
//! independent stores in the same process.

use super::codec::{decode_row, encode_row};
use super::value::{Row, Value};
use crate::catalog::{ColumnType, Registry, TableSchema};
use crate::error::{Error, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File holding the whole-registry schema snapshot, inside the data directory
const SCHEMA_SNAPSHOT: &str = "schema.json";

/// The storage engine: schema registry plus per-table data files and row cache
pub struct Store {
    /// Source of truth for table layouts
    registry: Registry,
    /// Lazily populated per-table cache. Absence of a key means "not yet
    /// loaded", not "empty table".
    cache: HashMap<String, Vec<Row>>,
    /// Directory holding `<table>.db` files and the schema snapshot
    data_dir: PathBuf,
}

impl Store {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    /// and loading the schema snapshot from `<data_dir>/schema.json`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        let registry = Registry::open(data_dir.join(SCHEMA_SNAPSHOT));

        Ok(Self {
            registry,
            cache: HashMap::new(),
            data_dir,
        })
    }

    /// The schema registry backing this store
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Define a table: register its schema (persisting the snapshot) and
    /// create its empty data file.
    pub fn create_table(&mut self, name: &str, columns: &[(String, String)]) -> Result<()> {
        self.registry.define(name, columns)?;
        std::fs::File::create(self.table_path(name))?;
        self.cache.insert(name.to_string(), Vec::new());
        Ok(())
    }

    /// All known table names. Iteration order is unspecified.
    pub fn list_tables(&self) -> Vec<String> {
        self.registry.list()
    }

    /// Insert a row of textual literals into `name`.
    ///
    /// Values are coerced to the column types at this boundary; any failure
    /// (arity, type, length) leaves both the cache and the file untouched.
    /// On success the encoded bytes are appended to the file before the row
    /// is appended to the cache: the two writes are not atomic, and this
    /// ordering means a crash between them loses a cached row but never
    /// fabricates one.
    pub fn insert(&mut self, name: &str, values: &[String]) -> Result<()> {
        let schema = self.lookup_schema(name)?;
        if values.len() != schema.column_count() {
            return Err(Error::ArityMismatch {
                expected: schema.column_count(),
                got: values.len(),
            });
        }
        let row = coerce_row(values, &schema)?;

        // Hydrate first so the cache entry reflects rows persisted by an
        // earlier process before the new row lands on top of them.
        self.hydrate(name, &schema)?;

        let bytes = encode_row(&row, &schema);
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.table_path(name))?;
        file.write_all(&bytes)?;

        if let Some(rows) = self.cache.get_mut(name) {
            rows.push(row);
        }
        Ok(())
    }

    /// All rows of `name`, hydrating the cache from disk on first access.
    /// A table with zero rows yields an empty slice, not an error.
    pub fn select_all(&mut self, name: &str) -> Result<&[Row]> {
        let schema = self.lookup_schema(name)?;
        let rows = self.hydrate(name, &schema)?;
        Ok(rows.as_slice())
    }

    /// Remove the first cached row whose primary-key column equals `id`.
    ///
    /// Cache-only: the data file is never rewritten or compacted, so a
    /// reload from disk resurrects the row. Kept as best-effort semantics
    /// rather than silently corrected.
    pub fn delete_where_id(&mut self, name: &str, id: i32) -> Result<()> {
        let schema = self.lookup_schema(name)?;
        let key = schema
            .primary_key()
            .ok_or_else(|| Error::NoPrimaryKey(name.to_string()))?;

        let rows = self.hydrate(name, &schema)?;
        let pos = rows
            .iter()
            .position(|row| row.get(key).and_then(Value::as_i32) == Some(id))
            .ok_or(Error::RowNotFound(id))?;
        rows.remove(pos);
        Ok(())
    }

    /// Reset the in-memory rows for `name` to empty.
    ///
    /// The schema registry and the data file are left untouched; whether
    /// drop should also remove them is an open design question, and the
    /// cache-only behavior is kept deliberately.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.lookup_schema(name)?;
        self.cache.insert(name.to_string(), Vec::new());
        Ok(())
    }

    /// Reload `name` from its data file, replacing any cached rows.
    pub fn load(&mut self, name: &str) -> Result<()> {
        let schema = self.lookup_schema(name)?;
        let rows = load_rows(&self.table_path(name), &schema)?;
        self.cache.insert(name.to_string(), rows);
        Ok(())
    }

    fn lookup_schema(&self, name: &str) -> Result<TableSchema> {
        self.registry
            .lookup(name)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Populate the cache entry for `name` from disk if it is absent
    fn hydrate(&mut self, name: &str, schema: &TableSchema) -> Result<&mut Vec<Row>> {
        let path = self.table_path(name);
        match self.cache.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let rows = load_rows(&path, schema)?;
                debug!("loaded {} rows from {}", rows.len(), path.display());
                Ok(entry.insert(rows))
            }
        }
    }

    fn table_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.db", name))
    }
}

/// Read an entire table file and decode it into rows, in file order.
///
/// A trailing partial chunk (a torn write) is dropped rather than decoded;
/// this is best-effort recovery, not strict integrity checking, so the drop
/// is logged instead of surfaced as an error. A missing file is an I/O
/// error: tables known to the registry always have a file from creation.
fn load_rows(path: &Path, schema: &TableSchema) -> Result<Vec<Row>> {
    let data = std::fs::read(path)?;
    let row_size = schema.row_byte_size();

    let mut rows = Vec::with_capacity(data.len() / row_size);
    for chunk in data.chunks_exact(row_size) {
        rows.push(decode_row(chunk, schema));
    }

    let torn = data.len() % row_size;
    if torn != 0 {
        warn!(
            "dropping {} trailing bytes of {} (shorter than one {}-byte row)",
            torn,
            path.display(),
            row_size
        );
    }

    Ok(rows)
}

/// Coerce textual literals into typed values at the insert boundary
fn coerce_row(values: &[String], schema: &TableSchema) -> Result<Row> {
    let mut out = Vec::with_capacity(values.len());

    for (literal, col) in values.iter().zip(schema.columns()) {
        match col.column_type {
            ColumnType::Integer => {
                let i = literal
                    .parse::<i32>()
                    .map_err(|_| Error::TypeMismatch(col.name.clone()))?;
                out.push(Value::Integer(i));
            }
            ColumnType::Text(size) => {
                if literal.len() > size {
                    return Err(Error::ValueTooLong {
                        column: col.name.clone(),
                        max: size,
                    });
                }
                out.push(Value::Text(literal.clone()));
            }
        }
    }

    Ok(Row::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn columns(defs: &[(&str, &str)]) -> Vec<(String, String)> {
        defs.iter()
            .map(|(n, t)| (n.to_string(), t.to_string()))
            .collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn users_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let mut store = Store::open(dir.path()).unwrap();
        store
            .create_table("users", &columns(&[("id", "INT"), ("name", "TEXT(8)")]))
            .unwrap();
        (dir, store)
    }

    #[test]
    fn test_insert_and_select() {
        let (_dir, mut store) = users_store();

        store.insert("users", &strings(&["1", "alice"])).unwrap();
        store.insert("users", &strings(&["2", "bob"])).unwrap();

        let rows = store.select_all("users").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], Row::new(vec![Value::from(1), Value::from("alice")]));
        assert_eq!(rows[1], Row::new(vec![Value::from(2), Value::from("bob")]));
    }

    #[test]
    fn test_select_empty_table() {
        let (_dir, mut store) = users_store();
        assert!(store.select_all("users").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_table() {
        let (_dir, mut store) = users_store();
        assert!(matches!(
            store.insert("ghosts", &strings(&["1", "x"])),
            Err(Error::TableNotFound(_))
        ));
        assert!(matches!(
            store.select_all("ghosts"),
            Err(Error::TableNotFound(_))
        ));
    }

    #[test]
    fn test_arity_mismatch_is_a_noop() {
        let (dir, mut store) = users_store();

        let result = store.insert("users", &strings(&["1"]));
        assert!(matches!(
            result,
            Err(Error::ArityMismatch {
                expected: 2,
                got: 1
            })
        ));

        assert!(store.select_all("users").unwrap().is_empty());
        let file_len = std::fs::metadata(dir.path().join("users.db")).unwrap().len();
        assert_eq!(file_len, 0);
    }

    #[test]
    fn test_type_mismatch_is_a_noop() {
        let (dir, mut store) = users_store();

        let result = store.insert("users", &strings(&["one", "alice"]));
        assert!(matches!(result, Err(Error::TypeMismatch(col)) if col == "id"));

        assert!(store.select_all("users").unwrap().is_empty());
        let file_len = std::fs::metadata(dir.path().join("users.db")).unwrap().len();
        assert_eq!(file_len, 0);
    }

    #[test]
    fn test_value_too_long_is_a_noop() {
        let (dir, mut store) = users_store();

        let result = store.insert("users", &strings(&["1", "more-than-eight"]));
        assert!(matches!(result, Err(Error::ValueTooLong { column, max: 8 }) if column == "name"));

        assert!(store.select_all("users").unwrap().is_empty());
        let file_len = std::fs::metadata(dir.path().join("users.db")).unwrap().len();
        assert_eq!(file_len, 0);
    }

    #[test]
    fn test_idempotent_reload() {
        let (_dir, mut store) = users_store();
        store.insert("users", &strings(&["1", "alice"])).unwrap();
        store.insert("users", &strings(&["2", "bob"])).unwrap();

        store.load("users").unwrap();
        let first: Vec<Row> = store.select_all("users").unwrap().to_vec();
        store.load("users").unwrap();
        let second: Vec<Row> = store.select_all("users").unwrap().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_torn_tail_is_dropped() {
        let (dir, mut store) = users_store();
        store.insert("users", &strings(&["1", "alice"])).unwrap();
        store.insert("users", &strings(&["2", "bob"])).unwrap();

        // Simulate a torn write: a trailing fragment shorter than one row
        let path = dir.path().join("users.db");
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0xAB, 0xCD, 0xEF]).unwrap();
        drop(file);

        store.load("users").unwrap();
        let rows = store.select_all("users").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], Row::new(vec![Value::from(2), Value::from("bob")]));
    }

    #[test]
    fn test_delete_then_reload_resurrects_the_row() {
        let (_dir, mut store) = users_store();
        store.insert("users", &strings(&["1", "alice"])).unwrap();
        store.insert("users", &strings(&["2", "bob"])).unwrap();
        store.insert("users", &strings(&["3", "carol"])).unwrap();

        store.delete_where_id("users", 2).unwrap();
        assert_eq!(store.select_all("users").unwrap().len(), 2);

        // Delete never touches the file, so a reload brings the row back
        store.load("users").unwrap();
        let rows = store.select_all("users").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get(0), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_delete_removes_only_first_match() {
        let (_dir, mut store) = users_store();
        store.insert("users", &strings(&["7", "first"])).unwrap();
        store.insert("users", &strings(&["7", "second"])).unwrap();

        store.delete_where_id("users", 7).unwrap();
        let rows = store.select_all("users").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(1), Some(&Value::Text("second".to_string())));
    }

    #[test]
    fn test_delete_missing_id() {
        let (_dir, mut store) = users_store();
        store.insert("users", &strings(&["1", "alice"])).unwrap();

        assert!(matches!(
            store.delete_where_id("users", 99),
            Err(Error::RowNotFound(99))
        ));
    }

    #[test]
    fn test_delete_without_primary_key() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::open(dir.path()).unwrap();
        store
            .create_table("notes", &columns(&[("title", "TEXT(16)"), ("hits", "INT")]))
            .unwrap();

        assert!(matches!(
            store.delete_where_id("notes", 1),
            Err(Error::NoPrimaryKey(_))
        ));
    }

    #[test]
    fn test_drop_clears_cache_but_not_the_file() {
        let (_dir, mut store) = users_store();
        store.insert("users", &strings(&["1", "alice"])).unwrap();

        store.drop_table("users").unwrap();
        assert!(store.select_all("users").unwrap().is_empty());

        store.load("users").unwrap();
        assert_eq!(store.select_all("users").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_for_known_table_is_an_error() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = Store::open(dir.path()).unwrap();
            store
                .create_table("users", &columns(&[("id", "INT"), ("name", "TEXT(8)")]))
                .unwrap();
        }
        std::fs::remove_file(dir.path().join("users.db")).unwrap();

        // A fresh store has no cache entry, so the load surfaces the error
        let mut store = Store::open(dir.path()).unwrap();
        assert!(matches!(
            store.select_all("users"),
            Err(Error::IoError(_))
        ));
    }

    #[test]
    fn test_insert_visible_after_restart() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = Store::open(dir.path()).unwrap();
            store
                .create_table("users", &columns(&[("id", "INT"), ("name", "TEXT(8)")]))
                .unwrap();
            store.insert("users", &strings(&["1", "alice"])).unwrap();
        }

        // A fresh store stands in for a restarted process: schemas come
        // back from the snapshot, rows from the data file.
        let mut store = Store::open(dir.path()).unwrap();
        store.insert("users", &strings(&["2", "bob"])).unwrap();
        let rows = store.select_all("users").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(1), Some(&Value::Text("alice".to_string())));
    }
}
