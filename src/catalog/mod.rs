//! Catalog module
//!
//! This module contains table schemas, column types, and the schema
//! registry with its JSON snapshot persistence.

pub mod registry;
pub mod schema;
pub mod types;

pub use registry::Registry;
pub use schema::{ColumnDef, TableSchema};
pub use types::ColumnType;
