//! High-level pipeline API: decode, match, classify, export.
//!
//! # Example
//!
//! ```rust,ignore
//! use excel_matcher::pipeline::compare_bytes;
//! use excel_matcher::export::INVENTORY;
//!
//! let result = compare_bytes(&primary_bytes, &catalog_bytes, None)?;
//! println!("{} matches", result.match_count());
//! let content = result.export(&INVENTORY);
//! ```
//!
//! Every stage is a pure function over its inputs; the hosting layer (CLI
//! or HTTP handler) owns the [`CompareResult`] and replaces it wholesale on
//! each run, never mutating it in place.

use crate::api::logs::{log_info, log_success, log_warning};
use crate::decoder::{decode_bytes, DecodedSheet, SheetFormat};
use crate::error::PipelineResult;
use crate::export::manifest::{build_manifest, NamedBlob};
use crate::export::{project, Schema, SCHEMAS};
use crate::matcher::{assign_locations, match_rows};
use crate::models::LocatedRow;

/// Number of data lines shown in previews.
pub const PREVIEW_LINES: usize = 5;

/// Shape of one decoded input, reported back to callers.
#[derive(Debug, Clone)]
pub struct SheetSummary {
    pub row_count: usize,
    pub headers: Vec<String>,
    pub format: String,
}

impl From<&DecodedSheet> for SheetSummary {
    fn from(sheet: &DecodedSheet) -> Self {
        let format = match &sheet.format {
            SheetFormat::Workbook => "workbook".to_string(),
            SheetFormat::Delimited { encoding, delimiter } => {
                format!("delimited ({encoding}, '{delimiter}')")
            }
        };
        Self {
            row_count: sheet.row_count(),
            headers: sheet.headers.clone(),
            format,
        }
    }
}

/// Result of one complete comparison run.
#[derive(Debug, Clone)]
pub struct CompareResult {
    /// Matched rows, each tagged with its location (sentinel when the run
    /// had no location sheet).
    pub rows: Vec<LocatedRow>,
    /// Distinct location labels in first-seen order; empty when the run
    /// had no location sheet.
    pub locations: Vec<String>,
    pub primary: SheetSummary,
    pub catalog: SheetSummary,
    pub location_sheet: Option<SheetSummary>,
}

impl CompareResult {
    pub fn match_count(&self) -> usize {
        self.rows.len()
    }

    /// All rows projected through one schema.
    pub fn export(&self, schema: &Schema) -> String {
        project(self.rows.iter().map(|l| &l.row), schema)
    }

    /// Header plus the first [`PREVIEW_LINES`] data lines of one schema.
    pub fn preview(&self, schema: &Schema) -> Vec<String> {
        self.export(schema)
            .lines()
            .take(1 + PREVIEW_LINES)
            .map(str::to_string)
            .collect()
    }

    /// The file set for one schema: combined plus per-location files when
    /// the run was classified.
    pub fn manifest(&self, schema: &Schema) -> Vec<NamedBlob> {
        build_manifest(&self.rows, &self.locations, schema)
    }

    /// The file sets of every schema, in schema order.
    pub fn manifests(&self) -> Vec<NamedBlob> {
        SCHEMAS.iter().flat_map(|s| self.manifest(s)).collect()
    }
}

/// Decode and compare uploaded files.
///
/// `locations` is the optional third sheet; without it the result carries
/// no location labels and manifests contain only the combined files.
pub fn compare_bytes(
    primary: &[u8],
    catalog: &[u8],
    locations: Option<&[u8]>,
) -> PipelineResult<CompareResult> {
    log_info("Decoding primary file...");
    let primary_sheet = decode_bytes(primary)?;
    log_success(format!("Primary: {} rows", primary_sheet.row_count()));

    log_info("Decoding catalog file...");
    let catalog_sheet = decode_bytes(catalog)?;
    log_success(format!("Catalog: {} rows", catalog_sheet.row_count()));

    let location_sheet = match locations {
        Some(bytes) => {
            log_info("Decoding location file...");
            let sheet = decode_bytes(bytes)?;
            log_success(format!("Locations: {} rows", sheet.row_count()));
            Some(sheet)
        }
        None => None,
    };

    Ok(compare_sheets(
        &primary_sheet,
        &catalog_sheet,
        location_sheet.as_ref(),
    ))
}

/// Compare already-decoded sheets. Pure; no IO, no logging state beyond
/// progress messages.
pub fn compare_sheets(
    primary: &DecodedSheet,
    catalog: &DecodedSheet,
    locations: Option<&DecodedSheet>,
) -> CompareResult {
    log_info("Matching rows by product code...");
    let matched = match_rows(&primary.rows, &catalog.rows);

    if matched.is_empty() {
        log_warning("No matching rows found");
    } else {
        log_success(format!(
            "{} of {} primary rows matched",
            matched.len(),
            primary.rows.len()
        ));
    }

    let (rows, location_labels) = match locations {
        Some(sheet) => {
            log_info("Assigning locations...");
            let (rows, labels) = assign_locations(matched, &sheet.rows);
            log_success(format!("{} distinct locations", labels.len()));
            (rows, labels)
        }
        None => (
            matched.into_iter().map(LocatedRow::unclassified).collect(),
            Vec::new(),
        ),
    };

    CompareResult {
        rows,
        locations: location_labels,
        primary: primary.into(),
        catalog: catalog.into(),
        location_sheet: locations.map(SheetSummary::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{AUDIT, CURRENT_PRODUCTS, INVENTORY};

    const PRIMARY: &[u8] =
        b"EXTRAINF02;DESCRI\xc3\x87\xc3\x83O;EXTRAINF01;QUANTIDADE;VALORUNIT\n\
          123;Produto 1;Info1;10;5.50\n\
          456;Produto 2;Info2;20;10,00\n\
          789;Produto 3;Info3;15;7.25\n";

    const CATALOG: &[u8] =
        b"C\xc3\xb3d. Produto;C\xc3\xb3d. Auxiliar;Descri\xc3\xa7\xc3\xa3o;Embalagem;Unidade\n\
          123;AUX123;Descri\xc3\xa7\xc3\xa3o 1;Pacote;UN\n\
          456;AUX456;Descri\xc3\xa7\xc3\xa3o 2;Caixa;CX\n\
          999;AUX999;Descri\xc3\xa7\xc3\xa3o 3;Unidade;UN\n";

    const LOCATIONS: &[u8] =
        b"EXTRAINF02;COD LOCAL;LOCALIZA\xc3\x87\xc3\x83O\n\
          123;L01;PRATELEIRA A\n";

    #[test]
    fn test_two_file_run() {
        let result = compare_bytes(PRIMARY, CATALOG, None).unwrap();

        assert_eq!(result.match_count(), 2);
        assert!(result.locations.is_empty());
        assert!(result.location_sheet.is_none());
        assert_eq!(result.primary.row_count, 3);
        assert_eq!(result.catalog.row_count, 3);

        let content = result.export(&INVENTORY);
        assert_eq!(
            content,
            "CODIGO;DESCRIÇÃO;QTDA;VALOR UNIT\n\
             AUX123;Produto 1;10;5.50\n\
             AUX456;Produto 2;20;10.00\n"
        );

        // Without locations the manifest is the combined file only.
        assert_eq!(result.manifest(&INVENTORY).len(), 1);
        assert_eq!(result.manifests().len(), 3);
    }

    #[test]
    fn test_three_file_run() {
        let result = compare_bytes(PRIMARY, CATALOG, Some(LOCATIONS)).unwrap();

        assert_eq!(result.match_count(), 2);
        assert_eq!(
            result.locations,
            vec!["PRATELEIRA A".to_string(), "SEM LOCALIZAÇÃO".to_string()]
        );

        // Combined + one file per location, for each of the three schemas.
        let blobs = result.manifest(&INVENTORY);
        assert_eq!(blobs.len(), 3);
        assert_eq!(blobs[0].filename, "estoque_list_TODOS.txt");
        assert_eq!(blobs[1].filename, "estoque_list_PRATELEIRA_A.txt");
        assert_eq!(blobs[2].filename, "estoque_list_SEM_LOCALIZA__O.txt");
        assert_eq!(result.manifests().len(), 9);
    }

    #[test]
    fn test_no_match_run_projects_header_only() {
        let catalog = b"C\xc3\xb3d. Produto;C\xc3\xb3d. Auxiliar\n999;AUX999\n";
        let result = compare_bytes(PRIMARY, catalog, None).unwrap();

        assert_eq!(result.match_count(), 0);
        for schema in [&INVENTORY, &AUDIT, &CURRENT_PRODUCTS] {
            assert_eq!(result.export(schema), format!("{}\n", schema.header));
        }
    }

    #[test]
    fn test_preview_is_header_plus_first_lines() {
        let result = compare_bytes(PRIMARY, CATALOG, None).unwrap();
        let preview = result.preview(&AUDIT);

        assert_eq!(preview.len(), 3); // header + 2 data lines
        assert_eq!(preview[0], AUDIT.header);
        assert_eq!(preview[1], "AUX123;Produto 1;10;Info1;123;0");
    }

    #[test]
    fn test_decode_failure_propagates() {
        assert!(compare_bytes(b"", CATALOG, None).is_err());
    }
}
