//! Result shaping for pages and exports.

use serde_json::Value;

use crate::types::{ExportFormat, ExportTable, Row, Suggestion};

/// Technical columns never exported.
pub const BANNED_COLUMNS: [&str; 12] = [
    "name.id",
    "product.id",
    "name.label",
    "name.label_nost",
    "storage.id",
    "storage.reference",
    "storage.computed_entity",
    "storage.nb_items",
    "storage.product",
    "borrow.storage",
    "borrow.id",
    "borrow.person",
];

/// Column order of exports. Columns not listed here follow, in the order
/// the store produced them.
pub const EXPORT_COLUMN_ORDER: [&str; 40] = [
    "product.name",
    "product.synonym",
    "product.specificity",
    "product.restricted_access",
    "product.creation_datetime",
    "product.archive",
    "product.person",
    "product.cas_number",
    "product.ce_number",
    "product.empirical_formula",
    "product.linear_formula",
    "product.td_formula",
    "product.msds",
    "product.is_cmr",
    "product.is_radio",
    "product.cmr_cat",
    "product.class_of_compounds",
    "product.physical_state",
    "product.risk_phrase",
    "product.safety_phrase",
    "product.hazard_statement",
    "product.precautionary_statement",
    "product.hazard_code",
    "product.signal_word",
    "product.symbol",
    "product.remark",
    "product.disposal_comment",
    "storage.store_location",
    "storage.volume_weight",
    "storage.unit",
    "storage.barecode",
    "storage.comment",
    "storage.batch_number",
    "storage.supplier",
    "storage.creation_datetime",
    "storage.entry_datetime",
    "storage.exit_datetime",
    "storage.opening_datetime",
    "storage.person",
    "storage.archive",
];

const BORROW_BORROWER: &str = "borrow.borrower";

/// Column order for an export whose first row is `first`.
pub fn export_columns(first: &Row) -> Vec<String> {
    let mut columns: Vec<String> = EXPORT_COLUMN_ORDER
        .iter()
        .chain(std::iter::once(&BORROW_BORROWER))
        .filter(|c| first.get(c).is_some())
        .map(|c| c.to_string())
        .collect();

    for column in first.columns() {
        if !is_banned(column) && !is_ordered(column) {
            columns.push(column.to_string());
        }
    }
    columns
}

/// Flattens `rows` into an export table.
///
/// The column order is taken from the first row and reused for every row;
/// cells a row lacks export as null.
pub fn project_export(
    rows: Vec<Row>,
    format: ExportFormat,
    suggestions: Vec<Suggestion>,
    label: String,
) -> ExportTable {
    let columns = match rows.first() {
        Some(first) => export_columns(first),
        None => EXPORT_COLUMN_ORDER
            .iter()
            .chain(std::iter::once(&BORROW_BORROWER))
            .map(|c| c.to_string())
            .collect(),
    };

    let rows = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    ExportTable {
        format,
        columns,
        rows,
        suggestions,
        label,
    }
}

fn is_banned(column: &str) -> bool {
    BANNED_COLUMNS.contains(&column)
}

fn is_ordered(column: &str) -> bool {
    column == BORROW_BORROWER || EXPORT_COLUMN_ORDER.contains(&column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_banned_columns_removed_and_order_applied() {
        let row = Row::new()
            .with("product.id", json!(1))
            .with("storage.barecode", json!("B1"))
            .with("name.label", json!("ACETONE"))
            .with("product.name", json!(10))
            .with("borrow.borrower", json!(null))
            .with("product.cas_number", json!("67-64-1"))
            .with("storage.id", json!(5));
        assert_eq!(
            export_columns(&row),
            vec![
                "product.name",
                "product.cas_number",
                "storage.barecode",
                "borrow.borrower"
            ]
        );
    }

    #[test]
    fn test_unknown_columns_last_in_encounter_order() {
        let row = Row::new()
            .with("store_location.label", json!("Lab A"))
            .with("product.name", json!(1))
            .with("product.tags", json!("x"));
        assert_eq!(
            export_columns(&row),
            vec!["product.name", "store_location.label", "product.tags"]
        );
    }

    #[test]
    fn test_column_order_stable_across_rows() {
        let first = Row::new()
            .with("product.name", json!(1))
            .with("storage.comment", json!("dry"));
        let second = Row::new()
            .with("storage.comment", json!("cold"))
            .with("product.name", json!(2))
            .with("storage.supplier", json!(9));
        let third = Row::new().with("product.name", json!(3));

        let table = project_export(
            vec![first, second, third],
            ExportFormat::Csv,
            vec![],
            "all products".into(),
        );
        assert_eq!(table.columns, vec!["product.name", "storage.comment"]);
        assert_eq!(table.rows[1], vec![json!(2), json!("cold")]);
        assert_eq!(table.rows[2], vec![json!(3), Value::Null]);
    }

    #[test]
    fn test_empty_export_has_header() {
        let table = project_export(vec![], ExportFormat::Csv, vec![], String::new());
        assert!(table.rows.is_empty());
        assert_eq!(table.columns.first().map(String::as_str), Some("product.name"));
        assert_eq!(table.columns.last().map(String::as_str), Some("borrow.borrower"));
    }
}
