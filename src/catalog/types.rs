//! Column types for FlatDB
//!
//! This module defines the two column types supported by the engine and
//! the byte widths that fix a table's on-disk row layout.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column data types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// 32-bit signed integer, stored as 4 little-endian bytes
    Integer,
    /// Fixed-width text of exactly `n` bytes, zero-padded on the right
    Text(usize),
}

impl ColumnType {
    /// On-disk size in bytes. Derived from the type, never set independently.
    pub fn byte_size(&self) -> usize {
        match self {
            ColumnType::Integer => 4,
            ColumnType::Text(n) => *n,
        }
    }

    /// Parse a textual type token: `INT` or `TEXT(n)` with `n > 0`.
    pub fn parse(token: &str) -> Result<ColumnType> {
        if token == "INT" {
            return Ok(ColumnType::Integer);
        }

        if let Some(rest) = token.strip_prefix("TEXT") {
            let inner = rest
                .strip_prefix('(')
                .and_then(|r| r.strip_suffix(')'))
                .ok_or_else(|| {
                    Error::InvalidColumn("TEXT type must specify a size, e.g. TEXT(32)".to_string())
                })?;
            let size: usize = inner
                .trim()
                .parse()
                .map_err(|_| Error::InvalidColumn(format!("invalid TEXT size '{}'", inner)))?;
            if size == 0 {
                return Err(Error::InvalidColumn("TEXT size must be positive".to_string()));
            }
            return Ok(ColumnType::Text(size));
        }

        Err(Error::InvalidColumn(format!(
            "unsupported column type '{}'",
            token
        )))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "INT"),
            ColumnType::Text(n) => write!(f, "TEXT({})", n),
        }
    }
}
