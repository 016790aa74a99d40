//! Schema definitions for FlatDB
//!
//! A table schema is an ordered list of column definitions. The order is
//! significant: it fixes the byte offset of every column in the encoded row,
//! and the total row width never changes after the table is created.

use super::types::ColumnType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column definition in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Column type (carries the byte width)
    pub column_type: ColumnType,
}

impl ColumnDef {
    /// Create a new column definition
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// On-disk width of this column
    pub fn byte_size(&self) -> usize {
        self.column_type.byte_size()
    }
}

/// Table schema - fixes the binary row layout of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name, unique across the registry
    pub table_name: String,
    /// Ordered list of columns
    columns: Vec<ColumnDef>,
    /// Column used as the delete key, if any. Always an `Integer` column,
    /// validated at definition time.
    primary_key: Option<usize>,
}

impl TableSchema {
    /// Create a schema from an ordered column list.
    ///
    /// Column names must be non-empty and unique within the table. The
    /// first column becomes the primary key when it is an `Integer`.
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnDef>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::InvalidColumn(
                "table must have at least one column".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for col in &columns {
            if col.name.is_empty() {
                return Err(Error::InvalidColumn("column name is empty".to_string()));
            }
            if !seen.insert(col.name.as_str()) {
                return Err(Error::InvalidColumn(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }

        let primary_key = match columns[0].column_type {
            ColumnType::Integer => Some(0),
            ColumnType::Text(_) => None,
        };

        Ok(Self {
            table_name: table_name.into(),
            columns,
            primary_key,
        })
    }

    /// Get all columns
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Index of the delete-key column, if the table has one
    pub fn primary_key(&self) -> Option<usize> {
        self.primary_key
    }

    /// Total encoded width of one row, in bytes
    pub fn row_byte_size(&self) -> usize {
        self.columns.iter().map(|c| c.byte_size()).sum()
    }
}
