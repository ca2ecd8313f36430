//! Uniform cell access over the two row shapes the decoder produces.
//!
//! Rows are either JSON objects (column name -> cell) or positional arrays
//! (when no header row was detected). Every field read in the pipeline goes
//! through [`get`] so the shape is handled in exactly one place.

use serde_json::Value;

/// Reference to a column: by header name or by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRef<'a> {
    Name(&'a str),
    Index(usize),
}

/// Fetch a cell from a row, whatever its shape.
///
/// Returns `None` for an absent column, for a null cell, and for a
/// name lookup on a positional row (or an index lookup on a named row).
pub fn get<'a>(row: &'a Value, column: ColumnRef<'_>) -> Option<&'a Value> {
    let cell = match (row, column) {
        (Value::Object(map), ColumnRef::Name(name)) => map.get(name),
        (Value::Array(cells), ColumnRef::Index(idx)) => cells.get(idx),
        _ => None,
    };
    cell.filter(|v| !v.is_null())
}

/// Fetch a cell rendered as text; `None` when the column is absent.
pub fn get_str(row: &Value, column: ColumnRef<'_>) -> Option<String> {
    get(row, column).map(display)
}

/// Fetch a cell rendered as text, degrading to `""` when absent.
pub fn get_str_or_empty(row: &Value, column: ColumnRef<'_>) -> String {
    get_str(row, column).unwrap_or_default()
}

/// Render a cell value the way it appears in exported files.
///
/// Whole numbers render without a fractional part ("10", not "10.0").
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
