//! Tabular decoder: uploaded bytes in, first-sheet rows out.
//!
//! Two containers are supported and sniffed from the leading bytes:
//!
//! - Excel workbooks (`.xlsx`, `.xls`, `.ods`) via calamine
//! - delimited text (`.csv` and friends) with encoding and delimiter
//!   auto-detection
//!
//! Rows come out as JSON objects keyed by column name. Cells keep their
//! type: text cells become strings, numeric cells numbers. This is what
//! makes the downstream join type-sensitive. Empty cells are omitted, so
//! an absent column reads as undefined rather than as an empty string.
//!
//! When a workbook's first row is not entirely textual no header row is
//! assumed and every row is produced as a positional array instead; the
//! [`field`] accessor handles both shapes.

pub mod field;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::{Map, Value};
use std::io::Cursor;
use std::path::Path;

use crate::error::{DecodeError, DecodeResult};

/// Magic prefix of ZIP-based workbooks (`.xlsx`, `.ods`).
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// Magic prefix of OLE compound documents (legacy `.xls`).
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// How the input bytes were decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetFormat {
    /// An Excel/OpenDocument workbook; the first sheet was read.
    Workbook,
    /// Delimited text with the detected encoding and delimiter.
    Delimited { encoding: String, delimiter: char },
}

/// The first sheet of a decoded file.
#[derive(Debug, Clone)]
pub struct DecodedSheet {
    /// Column headers, empty when no header row was detected.
    pub headers: Vec<String>,
    /// Data rows: JSON objects, or positional arrays in headerless mode.
    pub rows: Vec<Value>,
    pub format: SheetFormat,
}

impl DecodedSheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Decode a file from disk.
pub fn decode_file<P: AsRef<Path>>(path: P) -> DecodeResult<DecodedSheet> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_bytes(&bytes)
}

/// Decode raw bytes, sniffing the container from the leading magic.
pub fn decode_bytes(bytes: &[u8]) -> DecodeResult<DecodedSheet> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptySheet);
    }
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        decode_workbook(bytes)
    } else {
        decode_delimited(bytes)
    }
}

// =============================================================================
// Workbook decoding
// =============================================================================

fn decode_workbook(bytes: &[u8]) -> DecodeResult<DecodedSheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| DecodeError::Workbook(format!("failed to open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DecodeError::Workbook("workbook has no sheets".into()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| DecodeError::Workbook(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let Some(first) = rows.next() else {
        return Err(DecodeError::EmptySheet);
    };

    if is_header_row(first) {
        let headers: Vec<String> = first
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let data_rows: Vec<Value> = rows
            .map(|row| named_row(&headers, row))
            .filter(|row| row.as_object().is_some_and(|obj| !obj.is_empty()))
            .collect();

        Ok(DecodedSheet {
            headers,
            rows: data_rows,
            format: SheetFormat::Workbook,
        })
    } else {
        // No header row: keep every row, positionally.
        let data_rows: Vec<Value> = std::iter::once(first)
            .chain(rows)
            .map(positional_row)
            .collect();

        Ok(DecodedSheet {
            headers: Vec::new(),
            rows: data_rows,
            format: SheetFormat::Workbook,
        })
    }
}

/// A header row is one where every non-empty cell holds text.
fn is_header_row(row: &[Data]) -> bool {
    let mut saw_text = false;
    for cell in row {
        match cell {
            Data::Empty => {}
            Data::String(s) => {
                if !s.trim().is_empty() {
                    saw_text = true;
                }
            }
            _ => return false,
        }
    }
    saw_text
}

fn named_row(headers: &[String], row: &[Data]) -> Value {
    let mut obj = Map::new();
    for (header, cell) in headers.iter().zip(row) {
        if header.is_empty() {
            continue;
        }
        if let Some(value) = cell_value(cell) {
            obj.insert(header.clone(), value);
        }
    }
    Value::Object(obj)
}

fn positional_row(row: &[Data]) -> Value {
    // Null placeholders keep later cells at their original positions.
    Value::Array(row.iter().map(|c| cell_value(c).unwrap_or(Value::Null)).collect())
}

/// Convert one cell, keeping its type. Empty and error cells become `None`.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Float(f) => number_value(*f),
        Data::Int(i) => Some(Value::Number((*i).into())),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => number_value(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
    }
}

/// Whole floats become integer numbers so "10" round-trips as "10",
/// never "10.0".
fn number_value(f: f64) -> Option<Value> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(Value::Number((f as i64).into()))
    } else {
        serde_json::Number::from_f64(f).map(Value::Number)
    }
}

// =============================================================================
// Delimited-text decoding
// =============================================================================

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> DecodeResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8_lossy(bytes).to_string()),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        _ => {
            // Fallback: UTF-8 with lossy conversion
            Ok(String::from_utf8_lossy(bytes).to_string())
        }
    }
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

fn decode_delimited(bytes: &[u8]) -> DecodeResult<DecodedSheet> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;

    if content.trim().is_empty() {
        return Err(DecodeError::EmptySheet);
    }

    let delimiter = detect_delimiter(&content);
    let mut lines = content.lines();

    let header_line = lines.next().ok_or(DecodeError::EmptySheet)?;
    let headers: Vec<String> = header_line
        .split(delimiter)
        .map(|s| s.trim().trim_matches('"').to_string())
        .collect();

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let values: Vec<&str> = line.split(delimiter).collect();
        let mut obj = Map::new();

        for (i, header) in headers.iter().enumerate() {
            // A cell beyond a short row's end is absent, not empty.
            if let Some(raw) = values.get(i) {
                let cleaned = raw.trim().trim_matches('"');
                obj.insert(header.clone(), Value::String(cleaned.to_string()));
            }
        }

        rows.push(Value::Object(obj));
    }

    Ok(DecodedSheet {
        headers,
        rows,
        format: SheetFormat::Delimited {
            encoding,
            delimiter,
        },
    })
}
