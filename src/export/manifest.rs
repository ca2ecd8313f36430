//! Manifest building: which files one export action produces.
//!
//! Every schema always gets one combined file covering all rows, named with
//! the `_TODOS` suffix. When the rows were classified by location, each
//! location additionally gets its own file holding only that location's
//! rows, named by sanitizing the label.

use crate::export::{project, Schema};
use crate::models::LocatedRow;

/// A generated output file: name plus text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBlob {
    pub filename: String,
    pub content: String,
}

/// Make a location label safe for filenames: every character outside
/// `[A-Za-z0-9]` becomes `_`, then the whole label is upper-cased.
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_uppercase()
}

/// Build the file set for one schema: the combined file plus, when
/// `locations` is non-empty, one file per location.
///
/// The order is deterministic: combined first, then locations in the
/// first-seen order the classifier collected them.
pub fn build_manifest(rows: &[LocatedRow], locations: &[String], schema: &Schema) -> Vec<NamedBlob> {
    let mut blobs = Vec::with_capacity(1 + locations.len());

    blobs.push(NamedBlob {
        filename: format!("{}_TODOS.txt", schema.file_stem),
        content: project(rows.iter().map(|l| &l.row), schema),
    });

    for location in locations {
        let content = project(
            rows.iter()
                .filter(|l| &l.location == location)
                .map(|l| &l.row),
            schema,
        );
        blobs.push(NamedBlob {
            filename: format!("{}_{}.txt", schema.file_stem, sanitize_label(location)),
            content,
        });
    }

    blobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::INVENTORY;
    use crate::models::{LocatedRow, MatchedRow, NO_LOCATION};
    use serde_json::json;

    fn located(code: &str, location: &str) -> LocatedRow {
        LocatedRow {
            row: MatchedRow {
                key: json!(code),
                auxiliary_code: Some(format!("AUX{code}")),
                description: Some(format!("Produto {code}")),
                catalog_description: None,
                extra_info: None,
                packaging: None,
                unit: None,
                quantity: Some("1".into()),
                unit_price: Some("2.00".into()),
            },
            location_code: None,
            location: location.to_string(),
        }
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("Prateleira A"), "PRATELEIRA_A");
        assert_eq!(sanitize_label("SEM LOCALIZAÇÃO"), "SEM_LOCALIZA__O");
        assert_eq!(sanitize_label("corredor-3/b"), "CORREDOR_3_B");
    }

    #[test]
    fn test_manifest_without_locations_is_combined_only() {
        let rows = vec![located("1", NO_LOCATION)];
        let blobs = build_manifest(&rows, &[], &INVENTORY);

        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].filename, "estoque_list_TODOS.txt");
        assert!(blobs[0].content.contains("AUX1"));
    }

    #[test]
    fn test_manifest_per_location_counts_add_up() {
        let rows = vec![
            located("1", "A"),
            located("2", "B"),
            located("3", "A"),
        ];
        let locations = vec!["A".to_string(), "B".to_string()];

        let blobs = build_manifest(&rows, &locations, &INVENTORY);
        assert_eq!(blobs.len(), 3);

        let data_lines = |blob: &NamedBlob| blob.content.lines().count() - 1;
        assert_eq!(data_lines(&blobs[0]), 3);
        // Per-location counts sum to the combined count.
        assert_eq!(data_lines(&blobs[1]) + data_lines(&blobs[2]), data_lines(&blobs[0]));

        assert_eq!(blobs[1].filename, "estoque_list_A.txt");
        assert_eq!(blobs[2].filename, "estoque_list_B.txt");
    }

    #[test]
    fn test_empty_location_bucket_is_header_only() {
        let rows = vec![located("1", "A")];
        // A stale label with no rows still gets a (header-only) file.
        let locations = vec!["A".to_string(), "B".to_string()];

        let blobs = build_manifest(&rows, &locations, &INVENTORY);
        assert_eq!(blobs[2].content, format!("{}\n", INVENTORY.header));
    }

    #[test]
    fn test_manifest_is_deterministic() {
        let rows = vec![located("1", "A"), located("2", "B")];
        let locations = vec!["A".to_string(), "B".to_string()];

        let first = build_manifest(&rows, &locations, &INVENTORY);
        let second = build_manifest(&rows, &locations, &INVENTORY);
        assert_eq!(first, second);
    }
}
