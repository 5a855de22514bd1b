//! JSON Output Types
//!
//! This module defines the JSON bodies returned by the HTTP API.
//!
//! # Output Contract
//! - Error: `{"error": "..."}` or `{"error": "...", "details": "..."}`
//! - Column listing: `[{"name": "...", "type": "...", "isPrimary": bool}]`
//! - Table description: `{"name", "identifierColumn", "displayColumn", "columns"}`
//!
//! Field names are camelCase to match what browser clients expect.

use serde::{Deserialize, Serialize};

use crate::engine::{ColumnDescriptor, TableDescriptor};

/// Error body for failed requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Client-facing message
    pub error: String,

    /// Driver detail, present only for execution failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    /// Create an error body without details
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), details: None }
    }

    /// Create an error body carrying a driver message
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self { error: error.into(), details: Some(details.into()) }
    }
}

/// One entry of `GET /api/tables/{table}/columns`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView {
    pub name: String,

    /// Type as reported by the database (e.g. `character varying`)
    #[serde(rename = "type")]
    pub data_type: String,

    /// True when the column is filled by a sequence default
    pub is_primary: bool,
}

impl From<&ColumnDescriptor> for ColumnView {
    fn from(column: &ColumnDescriptor) -> Self {
        Self {
            name: column.name.clone(),
            data_type: column.reported_type.clone(),
            is_primary: column.has_auto_default,
        }
    }
}

/// Body of `GET /api/tables/{table}`
///
/// Role fields carry the resolved column with the `"id"`/`"name"` fallbacks applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub name: String,
    pub identifier_column: String,
    pub display_column: String,
    pub columns: Vec<ColumnView>,
}

impl From<&TableDescriptor> for TableView {
    fn from(table: &TableDescriptor) -> Self {
        Self {
            name: table.name.clone(),
            identifier_column: table.identifier_or_default().to_string(),
            display_column: table.display_or_default().to_string(),
            columns: table.columns.iter().map(ColumnView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DataType;

    #[test]
    fn test_error_body_without_details() {
        let body = ErrorBody::new("Table not found");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"Table not found"}"#);
    }

    #[test]
    fn test_error_body_with_details() {
        let body = ErrorBody::with_details("Database error", "relation does not exist");
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""error":"Database error""#));
        assert!(json.contains(r#""details":"relation does not exist""#));
    }

    #[test]
    fn test_column_view_field_names() {
        let column = ColumnDescriptor::new("id", "integer", Some("nextval('users_id_seq'::regclass)"));
        assert_eq!(column.data_type, DataType::Integer);

        let json = serde_json::to_value(ColumnView::from(&column)).unwrap();
        assert_eq!(json, serde_json::json!({"name": "id", "type": "integer", "isPrimary": true}));
    }

    #[test]
    fn test_table_view_applies_fallbacks() {
        let table = TableDescriptor::new(
            "events",
            vec![ColumnDescriptor::new("happened_at", "timestamp without time zone", None)],
        );

        let view = TableView::from(&table);
        assert_eq!(view.identifier_column, "id");
        assert_eq!(view.display_column, "name");

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("identifierColumn").is_some());
        assert!(json.get("displayColumn").is_some());
    }
}
