//! Storage engine module
//!
//! This module contains the storage engine components:
//! - Typed values and rows
//! - The fixed-width row codec
//! - The per-table store (data files + in-memory row cache)

pub mod codec;
pub mod store;
pub mod value;

pub use codec::{decode_row, encode_row};
pub use store::Store;
pub use value::{Row, Value};
