//! Row matching: the equijoin against the catalog sheet and the optional
//! location classification.
//!
//! ```text
//! primary rows ──┐
//!                ├──▶ match_rows ──▶ MatchedRow* ──▶ assign_locations ──▶ LocatedRow*
//! catalog rows ──┘                                        ▲
//!                                          location rows ─┘
//! ```
//!
//! Join policy, kept exactly as the upstream tool behaves:
//!
//! - a primary row with no catalog match is dropped entirely
//! - under duplicate keys the first catalog row in sheet order wins and
//!   later duplicates are never consulted
//! - keys compare by strict value equality: a numeric cell never matches
//!   a text cell with the same digits
//!
//! Classification is different: it never drops. Every matched row comes out
//! located, with the [`NO_LOCATION`] sentinel when the location sheet has no
//! entry for its code.

use serde_json::Value;

use crate::decoder::field::{self, ColumnRef};
use crate::models::{columns, LocatedRow, MatchedRow, NO_LOCATION};

/// Join every primary row against the first catalog row sharing its
/// product code.
///
/// The scan is linear per primary row; expected sheet sizes are hundreds
/// to low thousands of rows.
pub fn match_rows(primary: &[Value], catalog: &[Value]) -> Vec<MatchedRow> {
    let key_col = ColumnRef::Name(columns::PRIMARY_KEY);
    let catalog_key_col = ColumnRef::Name(columns::CATALOG_KEY);

    let mut matched = Vec::new();

    for row in primary {
        let Some(key) = field::get(row, key_col) else {
            // No key, nothing to match against.
            continue;
        };

        let Some(hit) = catalog
            .iter()
            .find(|candidate| field::get(candidate, catalog_key_col) == Some(key))
        else {
            continue;
        };

        matched.push(MatchedRow {
            key: key.clone(),
            auxiliary_code: field::get_str(hit, ColumnRef::Name(columns::CATALOG_AUXILIARY)),
            description: field::get_str(row, ColumnRef::Name(columns::PRIMARY_DESCRIPTION)),
            catalog_description: field::get_str(hit, ColumnRef::Name(columns::CATALOG_DESCRIPTION)),
            extra_info: field::get_str(row, ColumnRef::Name(columns::PRIMARY_EXTRA_INFO)),
            packaging: field::get_str(hit, ColumnRef::Name(columns::CATALOG_PACKAGING)),
            unit: field::get_str(hit, ColumnRef::Name(columns::CATALOG_UNIT)),
            quantity: field::get_str(row, ColumnRef::Name(columns::PRIMARY_QUANTITY)),
            unit_price: field::get_str(row, ColumnRef::Name(columns::PRIMARY_UNIT_PRICE)),
        });
    }

    matched
}

/// Tag every matched row with its location and collect the distinct
/// location labels in first-seen order.
///
/// Rows whose code has no location entry (or an entry with an empty label)
/// get the [`NO_LOCATION`] sentinel, and the sentinel joins the label set
/// so the unassigned bucket participates in per-location exports.
pub fn assign_locations(
    rows: Vec<MatchedRow>,
    location_rows: &[Value],
) -> (Vec<LocatedRow>, Vec<String>) {
    let key_col = ColumnRef::Name(columns::LOCATION_KEY);
    let label_col = ColumnRef::Name(columns::LOCATION_LABEL);
    let code_col = ColumnRef::Name(columns::LOCATION_CODE);

    let mut locations: Vec<String> = Vec::new();
    let mut located = Vec::with_capacity(rows.len());

    for row in rows {
        let hit = location_rows
            .iter()
            .find(|candidate| field::get(candidate, key_col) == Some(&row.key));

        let location = hit
            .and_then(|l| field::get_str(l, label_col))
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| NO_LOCATION.to_string());

        if !locations.contains(&location) {
            locations.push(location.clone());
        }

        located.push(LocatedRow {
            location_code: hit.and_then(|l| field::get_str(l, code_col)),
            location,
            row,
        });
    }

    (located, locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn primary_rows() -> Vec<Value> {
        vec![
            json!({"EXTRAINF02": "123", "DESCRIÇÃO": "Produto 1", "EXTRAINF01": "Info1", "QUANTIDADE": "10", "VALORUNIT": "5.50"}),
            json!({"EXTRAINF02": "456", "DESCRIÇÃO": "Produto 2", "EXTRAINF01": "Info2", "QUANTIDADE": "20", "VALORUNIT": "10.00"}),
            json!({"EXTRAINF02": "789", "DESCRIÇÃO": "Produto 3", "EXTRAINF01": "Info3", "QUANTIDADE": "15", "VALORUNIT": "7.25"}),
        ]
    }

    fn catalog_rows() -> Vec<Value> {
        vec![
            json!({"Cód. Produto": "123", "Cód. Auxiliar": "AUX123", "Descrição": "Descrição 1", "Embalagem": "Pacote", "Unidade": "UN"}),
            json!({"Cód. Produto": "456", "Cód. Auxiliar": "AUX456", "Descrição": "Descrição 2", "Embalagem": "Caixa", "Unidade": "CX"}),
            json!({"Cód. Produto": "999", "Cód. Auxiliar": "AUX999", "Descrição": "Descrição 3", "Embalagem": "Unidade", "Unidade": "UN"}),
        ]
    }

    #[test]
    fn test_match_copies_fields_from_both_rows() {
        let matched = match_rows(&primary_rows(), &catalog_rows());

        // Only 123 and 456 have matches
        assert_eq!(matched.len(), 2);

        let first = &matched[0];
        assert_eq!(first.product_code(), "123");
        assert_eq!(first.auxiliary_code.as_deref(), Some("AUX123"));
        assert_eq!(first.description.as_deref(), Some("Produto 1"));
        assert_eq!(first.catalog_description.as_deref(), Some("Descrição 1"));
        assert_eq!(first.extra_info.as_deref(), Some("Info1"));
        assert_eq!(first.packaging.as_deref(), Some("Pacote"));
        assert_eq!(first.unit.as_deref(), Some("UN"));
        assert_eq!(first.quantity.as_deref(), Some("10"));
        assert_eq!(first.unit_price.as_deref(), Some("5.50"));

        assert_eq!(matched[1].auxiliary_code.as_deref(), Some("AUX456"));
    }

    #[test]
    fn test_unmatched_primaries_are_dropped() {
        let catalog = vec![catalog_rows()[0].clone()];
        let matched = match_rows(&primary_rows(), &catalog);

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].product_code(), "123");
    }

    #[test]
    fn test_no_matches_yields_empty() {
        let catalog = vec![json!({"Cód. Produto": "999", "Cód. Auxiliar": "AUX999"})];
        assert!(match_rows(&primary_rows(), &catalog).is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(match_rows(&[], &[]).is_empty());
        assert!(match_rows(&[], &catalog_rows()).is_empty());
        assert!(match_rows(&primary_rows(), &[]).is_empty());
    }

    #[test]
    fn test_match_is_type_sensitive() {
        // Numeric 123 on the primary side, text "123" on the catalog side.
        let primary = vec![json!({"EXTRAINF02": 123, "DESCRIÇÃO": "Produto 1"})];
        assert!(match_rows(&primary, &catalog_rows()).is_empty());

        // Numeric on both sides matches.
        let catalog = vec![json!({"Cód. Produto": 123, "Cód. Auxiliar": "AUX123"})];
        let matched = match_rows(&primary, &catalog);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].product_code(), "123");
    }

    #[test]
    fn test_duplicate_keys_first_match_wins() {
        let primary = vec![json!({"EXTRAINF02": "123"})];
        let catalog = vec![
            json!({"Cód. Produto": "123", "Cód. Auxiliar": "FIRST"}),
            json!({"Cód. Produto": "123", "Cód. Auxiliar": "SECOND"}),
        ];

        let matched = match_rows(&primary, &catalog);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].auxiliary_code.as_deref(), Some("FIRST"));
    }

    #[test]
    fn test_rows_without_key_never_match() {
        let primary = vec![json!({"DESCRIÇÃO": "sem código"})];
        let catalog = vec![json!({"Cód. Auxiliar": "AUX123"})];
        assert!(match_rows(&primary, &catalog).is_empty());
    }

    #[test]
    fn test_missing_columns_become_none() {
        let primary = vec![json!({"EXTRAINF02": "123"})];
        let catalog = vec![json!({"Cód. Produto": "123"})];

        let matched = match_rows(&primary, &catalog);
        assert_eq!(matched.len(), 1);
        assert!(matched[0].auxiliary_code.is_none());
        assert!(matched[0].quantity.is_none());
        assert!(matched[0].unit_price.is_none());
    }

    #[test]
    fn test_assign_locations_never_drops() {
        let matched = match_rows(&primary_rows(), &catalog_rows());
        let count = matched.len();

        let location_rows = vec![
            json!({"EXTRAINF02": "123", "COD LOCAL": "L01", "LOCALIZAÇÃO": "PRATELEIRA A"}),
        ];

        let (located, locations) = assign_locations(matched, &location_rows);
        assert_eq!(located.len(), count);

        assert_eq!(located[0].location, "PRATELEIRA A");
        assert_eq!(located[0].location_code.as_deref(), Some("L01"));

        // 456 has no location entry: sentinel, and the sentinel is a bucket.
        assert_eq!(located[1].location, NO_LOCATION);
        assert!(located[1].location_code.is_none());
        assert_eq!(locations, vec!["PRATELEIRA A".to_string(), NO_LOCATION.to_string()]);
    }

    #[test]
    fn test_assign_locations_empty_label_gets_sentinel() {
        let matched = match_rows(&primary_rows(), &catalog_rows());
        let location_rows = vec![
            json!({"EXTRAINF02": "123", "COD LOCAL": "L01", "LOCALIZAÇÃO": ""}),
        ];

        let (located, locations) = assign_locations(matched, &location_rows);
        assert_eq!(located[0].location, NO_LOCATION);
        assert_eq!(locations, vec![NO_LOCATION.to_string()]);
    }

    #[test]
    fn test_location_labels_deduplicated_in_first_seen_order() {
        let matched = match_rows(&primary_rows(), &catalog_rows());
        let location_rows = vec![
            json!({"EXTRAINF02": "123", "LOCALIZAÇÃO": "DEPÓSITO"}),
            json!({"EXTRAINF02": "456", "LOCALIZAÇÃO": "DEPÓSITO"}),
        ];

        let (located, locations) = assign_locations(matched, &location_rows);
        assert_eq!(located.len(), 2);
        assert_eq!(locations, vec!["DEPÓSITO".to_string()]);
    }
}
