//! FlatDB - a minimal fixed-width tabular data store written in Rust
//!
//! This library provides the core components:
//! - Schema registry with JSON snapshot persistence
//! - Fixed-width binary row codec
//! - Per-table store (append-only data files + in-memory row cache)
//! - Textual command parsing for the interactive shell

pub mod catalog;
pub mod command;
pub mod error;
pub mod storage;

pub use error::{Error, Result};
