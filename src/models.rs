//! Domain models for the matching pipeline.
//!
//! - [`MatchedRow`] - a primary row joined with its catalog row
//! - [`LocatedRow`] - a matched row plus its location label
//! - [`columns`] - the column names the input sheets are read by
//! - [`NO_LOCATION`] - sentinel label for rows without a location entry

use serde_json::Value;

use crate::decoder::field;

/// Label assigned to matched rows whose code has no entry in the
/// location sheet.
pub const NO_LOCATION: &str = "SEM LOCALIZAÇÃO";

/// Column names of the three input sheets, exactly as the upstream
/// system exports them (accents included).
pub mod columns {
    /// Product code on the primary sheet; the join key.
    pub const PRIMARY_KEY: &str = "EXTRAINF02";
    pub const PRIMARY_DESCRIPTION: &str = "DESCRIÇÃO";
    pub const PRIMARY_EXTRA_INFO: &str = "EXTRAINF01";
    pub const PRIMARY_QUANTITY: &str = "QUANTIDADE";
    pub const PRIMARY_UNIT_PRICE: &str = "VALORUNIT";

    /// Product code on the catalog sheet; matched against [`PRIMARY_KEY`].
    pub const CATALOG_KEY: &str = "Cód. Produto";
    pub const CATALOG_AUXILIARY: &str = "Cód. Auxiliar";
    pub const CATALOG_DESCRIPTION: &str = "Descrição";
    pub const CATALOG_PACKAGING: &str = "Embalagem";
    pub const CATALOG_UNIT: &str = "Unidade";

    /// Product code on the location sheet; matched against [`PRIMARY_KEY`].
    pub const LOCATION_KEY: &str = "EXTRAINF02";
    pub const LOCATION_CODE: &str = "COD LOCAL";
    pub const LOCATION_LABEL: &str = "LOCALIZAÇÃO";
}

// =============================================================================
// Matched Row
// =============================================================================

/// A primary row joined with the first catalog row sharing its product code.
///
/// Exists only for primary rows that found a catalog match; unmatched rows
/// never produce a `MatchedRow`. Absent columns are `None` and degrade to
/// the per-field defaults at projection time.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRow {
    /// The raw join key cell. Kept as a [`Value`] so downstream lookups
    /// (the location join) stay type-sensitive: a numeric cell never
    /// equals a text cell with the same digits.
    pub key: Value,
    /// `Cód. Auxiliar` from the catalog sheet.
    pub auxiliary_code: Option<String>,
    /// `DESCRIÇÃO` from the primary sheet.
    pub description: Option<String>,
    /// `Descrição` from the catalog sheet.
    pub catalog_description: Option<String>,
    /// `EXTRAINF01` from the primary sheet.
    pub extra_info: Option<String>,
    /// `Embalagem` from the catalog sheet.
    pub packaging: Option<String>,
    /// `Unidade` from the catalog sheet.
    pub unit: Option<String>,
    /// `QUANTIDADE` from the primary sheet.
    pub quantity: Option<String>,
    /// `VALORUNIT` from the primary sheet.
    pub unit_price: Option<String>,
}

impl MatchedRow {
    /// The join key rendered as text, as it appears in exported files.
    pub fn product_code(&self) -> String {
        field::display(&self.key)
    }
}

// =============================================================================
// Located Row
// =============================================================================

/// A [`MatchedRow`] tagged with its location.
///
/// Classification never drops rows: a row without a location entry carries
/// the [`NO_LOCATION`] sentinel, never an empty label.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedRow {
    pub row: MatchedRow,
    /// `COD LOCAL` from the location sheet, when matched.
    pub location_code: Option<String>,
    /// `LOCALIZAÇÃO` from the location sheet, or [`NO_LOCATION`].
    pub location: String,
}

impl LocatedRow {
    /// Wrap a matched row that was never run against a location sheet.
    pub fn unclassified(row: MatchedRow) -> Self {
        Self {
            row,
            location_code: None,
            location: NO_LOCATION.to_string(),
        }
    }
}
