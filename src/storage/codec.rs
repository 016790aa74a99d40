//! Fixed-width row codec for FlatDB
//!
//! A table's schema fixes a constant byte width per row: 4 bytes for every
//! INT column, the declared size for every TEXT column. Row boundaries in
//! the data file are implicit; any reader must know the schema
//! independently of the file. `decode_row(encode_row(r, s), s) == r` holds
//! byte-for-byte for every row valid under its schema.

use super::value::{Row, Value};
use crate::catalog::{ColumnType, TableSchema};

/// Encode a row into its fixed-width binary representation.
///
/// Assumes the row was validated at the insert boundary: one value per
/// column, matching types, text within the declared size. Under that
/// contract this never fails and never truncates.
pub fn encode_row(row: &Row, schema: &TableSchema) -> Vec<u8> {
    let mut buf = Vec::with_capacity(schema.row_byte_size());

    for (value, col) in row.values().iter().zip(schema.columns()) {
        match value {
            Value::Integer(i) => buf.extend_from_slice(&i.to_le_bytes()),
            Value::Text(s) => {
                buf.extend_from_slice(s.as_bytes());
                // Zero padding up to the declared column width
                buf.resize(buf.len() + (col.byte_size() - s.len()), 0);
            }
        }
    }

    buf
}

/// Decode exactly one fixed-width row.
///
/// `bytes` must be exactly `schema.row_byte_size()` long; callers decoding
/// a batch slice the file into row-sized chunks first.
pub fn decode_row(bytes: &[u8], schema: &TableSchema) -> Row {
    let mut values = Vec::with_capacity(schema.column_count());
    let mut offset = 0;

    for col in schema.columns() {
        let size = col.byte_size();
        let field = &bytes[offset..offset + size];
        match col.column_type {
            ColumnType::Integer => {
                values.push(Value::Integer(i32::from_le_bytes([
                    field[0], field[1], field[2], field[3],
                ])));
            }
            ColumnType::Text(_) => {
                // Padding is the zero byte, so stripping trailing zeros is
                // exact even for values that end in spaces.
                let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
                values.push(Value::Text(
                    String::from_utf8_lossy(&field[..end]).into_owned(),
                ));
            }
        }
        offset += size;
    }

    Row::new(values)
}
