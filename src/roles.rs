//! Role Inference
//!
//! Derives which column identifies a row and which one names it, from
//! catalog metadata alone.

use crate::engine::{ColumnDescriptor, TableDescriptor};

/// Substring a display column's name must contain (case-insensitive)
const DISPLAY_NAME_MARKER: &str = "name";

/// Assign `identifier_column` and `display_column` from the table's columns
///
/// - identifier: first column, by ordinal position, with a sequence default
/// - display: first text-typed column whose name contains `name`
///
/// Roles that cannot be inferred are left unset.
#[must_use]
pub fn infer_roles(mut table: TableDescriptor) -> TableDescriptor {
    table.identifier_column = table
        .columns
        .iter()
        .find(|c| c.has_auto_default)
        .map(|c| c.name.clone());

    table.display_column =
        table.columns.iter().find(|c| is_display_candidate(c)).map(|c| c.name.clone());

    table
}

fn is_display_candidate(column: &ColumnDescriptor) -> bool {
    column.data_type.is_text() && column.name.to_ascii_lowercase().contains(DISPLAY_NAME_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEQ: Option<&str> = Some("nextval('t_id_seq'::regclass)");

    #[test]
    fn test_first_auto_default_column_is_identifier() {
        let table = TableDescriptor::new(
            "t",
            vec![
                ColumnDescriptor::new("label", "text", None),
                ColumnDescriptor::new("row_id", "bigint", SEQ),
                ColumnDescriptor::new("legacy_id", "integer", SEQ),
            ],
        );
        assert_eq!(infer_roles(table).identifier_column.as_deref(), Some("row_id"));
    }

    #[test]
    fn test_no_auto_default_leaves_identifier_unset() {
        let table = TableDescriptor::new("t", vec![ColumnDescriptor::new("id", "integer", None)]);
        let table = infer_roles(table);
        assert!(table.identifier_column.is_none());
        assert_eq!(table.identifier_or_default(), "id");
    }

    #[test]
    fn test_display_column_requires_text_type() {
        let table = TableDescriptor::new(
            "t",
            vec![
                ColumnDescriptor::new("name_hash", "bigint", None),
                ColumnDescriptor::new("brand_name", "character varying", None),
                ColumnDescriptor::new("username", "text", None),
            ],
        );
        assert_eq!(infer_roles(table).display_column.as_deref(), Some("brand_name"));
    }

    #[test]
    fn test_citext_column_can_be_display() {
        let table = TableDescriptor::new(
            "brands",
            vec![
                ColumnDescriptor::new("id", "integer", SEQ),
                ColumnDescriptor::new("brand_name", "USER-DEFINED", None).with_udt_name("citext"),
            ],
        );
        assert_eq!(infer_roles(table).display_column.as_deref(), Some("brand_name"));
    }

    #[test]
    fn test_display_match_is_case_insensitive() {
        let table =
            TableDescriptor::new("t", vec![ColumnDescriptor::new("DisplayName", "text", None)]);
        assert_eq!(infer_roles(table).display_column.as_deref(), Some("DisplayName"));
    }

    #[test]
    fn test_no_text_name_column_falls_back_to_literal() {
        let table = TableDescriptor::new(
            "t",
            vec![
                ColumnDescriptor::new("id", "integer", SEQ),
                ColumnDescriptor::new("title", "text", None),
                ColumnDescriptor::new("name_code", "integer", None),
            ],
        );
        let table = infer_roles(table);
        assert!(table.display_column.is_none());
        assert_eq!(table.display_or_default(), "name");
    }

    #[test]
    fn test_inferred_roles_name_existing_columns() {
        let table = infer_roles(TableDescriptor::new(
            "t",
            vec![
                ColumnDescriptor::new("id", "integer", SEQ),
                ColumnDescriptor::new("name", "character", None),
            ],
        ));
        for role in [&table.identifier_column, &table.display_column] {
            let role = role.as_deref().unwrap();
            assert!(table.has_column(role));
        }
    }
}
