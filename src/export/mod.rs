//! Output projection: matched rows in, fixed-layout text files out.
//!
//! Three layouts exist, consumed by a legacy inventory terminal. Each is a
//! [`Schema`]: a verbatim header line plus an ordered list of field
//! extractors, serialized as semicolon-separated lines with a trailing
//! newline. Schemas are data, not code; [`project`] is the single
//! serializer for all of them.
//!
//! Field policy: a missing source degrades to the field's declared default
//! (`""`, `"0"` or `"0.00"`) — never an error, never a shifted column. A
//! field explicitly present as the empty string is emitted as-is.

pub mod manifest;

use crate::models::MatchedRow;

// =============================================================================
// Normalizers
// =============================================================================

/// Normalize a unit-price cell to exactly two decimal digits.
///
/// Accepts both decimal separators ("15,50" and "15.50" are the same
/// price). Absent, empty and unparsable values all come out as "0.00".
pub fn normalize_amount(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "0.00".to_string();
    };

    match raw.replace(',', ".").trim().parse::<f64>() {
        Ok(value) if value.is_finite() => format!("{value:.2}"),
        _ => "0.00".to_string(),
    }
}

// =============================================================================
// Schemas
// =============================================================================

/// One output column: where the value comes from and how it degrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    /// `Cód. Auxiliar`, default `""`.
    AuxiliaryCode,
    /// Primary-sheet description, default `""`.
    Description,
    /// `QUANTIDADE`, default `"0"`.
    Quantity,
    /// `VALORUNIT` through [`normalize_amount`].
    UnitPrice,
    /// `EXTRAINF01`, default `""`.
    ExtraInfo,
    /// The join key, rendered as text.
    ProductCode,
    /// A fixed constant, never computed.
    Literal(&'static str),
}

impl Field {
    fn extract(self, row: &MatchedRow) -> String {
        match self {
            Field::AuxiliaryCode => row.auxiliary_code.clone().unwrap_or_default(),
            Field::Description => row.description.clone().unwrap_or_default(),
            Field::Quantity => row.quantity.clone().unwrap_or_else(|| "0".to_string()),
            Field::UnitPrice => normalize_amount(row.unit_price.as_deref()),
            Field::ExtraInfo => row.extra_info.clone().unwrap_or_default(),
            Field::ProductCode => row.product_code(),
            Field::Literal(text) => text.to_string(),
        }
    }
}

/// A fixed output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Short identifier used in CLI flags and API payloads.
    pub name: &'static str,
    /// Header line, emitted verbatim.
    pub header: &'static str,
    /// Stem for generated per-location filenames.
    pub file_stem: &'static str,
    /// Human-readable download filename.
    pub display_name: &'static str,
    fields: &'static [Field],
}

/// Inventory list: code, description, quantity, normalized unit price.
pub const INVENTORY: Schema = Schema {
    name: "estoque",
    header: "CODIGO;DESCRIÇÃO;QTDA;VALOR UNIT",
    file_stem: "estoque_list",
    display_name: "Estoque lista.txt",
    fields: &[
        Field::AuxiliaryCode,
        Field::Description,
        Field::Quantity,
        Field::UnitPrice,
    ],
};

/// Audit ("conferência") list. The mangled `DESCRI  O` header is what the
/// consuming terminal expects; do not fix it. The trailing column is the
/// constant `0` on every row.
pub const AUDIT: Schema = Schema {
    name: "conferencia",
    header: "CODIGO;DESCRI  O;QTDA;EXTRAINF01;EXTRAINF02;REQEXTRADATA",
    file_stem: "conferencia_ok",
    display_name: "Conferência Ok.txt",
    fields: &[
        Field::AuxiliaryCode,
        Field::Description,
        Field::Quantity,
        Field::ExtraInfo,
        Field::ProductCode,
        Field::Literal("0"),
    ],
};

/// Current-products list; same constant trailing column as [`AUDIT`].
pub const CURRENT_PRODUCTS: Schema = Schema {
    name: "produtos",
    header: "CODE;DESCRIPTION;EXTRAINF01;EXTRAINF02;REQEXTRADATA",
    file_stem: "lista_produtos_atuais",
    display_name: "Lista de Produtos ATUAIS.txt",
    fields: &[
        Field::AuxiliaryCode,
        Field::Description,
        Field::ExtraInfo,
        Field::ProductCode,
        Field::Literal("0"),
    ],
};

/// Every schema, in the order exports are presented.
pub const SCHEMAS: [&Schema; 3] = [&INVENTORY, &AUDIT, &CURRENT_PRODUCTS];

/// Look a schema up by its short name.
pub fn schema_by_name(name: &str) -> Option<&'static Schema> {
    SCHEMAS.iter().copied().find(|s| s.name == name)
}

// =============================================================================
// Projection
// =============================================================================

/// Serialize rows through a schema.
///
/// The output is the header line plus one line per row, each terminated by
/// a newline; with no rows the output is exactly the header plus one
/// trailing newline.
pub fn project<'a, I>(rows: I, schema: &Schema) -> String
where
    I: IntoIterator<Item = &'a MatchedRow>,
{
    let mut content = String::from(schema.header);
    content.push('\n');

    for row in rows {
        let line: Vec<String> = schema.fields.iter().map(|f| f.extract(row)).collect();
        content.push_str(&line.join(";"));
        content.push('\n');
    }

    content
}
