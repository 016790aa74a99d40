//! Error types for FlatDB
//!
//! This module defines all error types used throughout the engine.

use thiserror::Error;

/// The main error type for FlatDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Schema Errors ==========
    #[error("Schema error: table '{0}' already exists")]
    DuplicateTable(String),

    #[error("Schema error: invalid column definition: {0}")]
    InvalidColumn(String),

    #[error("Schema error: table '{0}' not found")]
    TableNotFound(String),

    // ========== Insert Errors ==========
    #[error("Insert error: expected {expected} values, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("Insert error: expected INT value for column '{0}'")]
    TypeMismatch(String),

    #[error("Insert error: value too long for column '{column}' (max {max})")]
    ValueTooLong { column: String, max: usize },

    // ========== Delete Errors ==========
    #[error("Delete error: no row found with id {0}")]
    RowNotFound(i32),

    #[error("Delete error: table '{0}' has no integer primary key")]
    NoPrimaryKey(String),

    // ========== Command Errors ==========
    #[error("Parse error: {0}")]
    ParseError(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    SnapshotCorrupt(String),
}

/// Result type alias for FlatDB operations
pub type Result<T> = std::result::Result<T, Error>;
