//! Query Builder
//!
//! Turns an [`Intent`] plus its table into a [`Statement`].
//!
//! # Injection Boundary
//! - Identifiers (table, filter/order column) are taken from the catalog,
//!   re-checked against the table's columns, and emitted as quoted
//!   `PostgreSQL` identifiers.
//! - Every value from the prompt is a bound parameter (`$1`).
//! - Every shape carries a `LIMIT`.

use serde::Serialize;

use crate::engine::TableDescriptor;
use crate::error::{Result, TablecastError};
use crate::intent::Intent;

/// A SQL template and the values bound to its placeholders, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<String>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<String>) -> Self {
        Self { sql: sql.into(), params }
    }
}

/// Quote an identifier for `PostgreSQL`, doubling embedded quotes
#[must_use]
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Build the statement for `intent` against `table`
///
/// Fails with `UnknownColumn` if the intent names a column the table does
/// not have.
pub fn build(table: &TableDescriptor, intent: &Intent) -> Result<Statement> {
    let from = quote_ident(&table.name);
    let limit = intent.limit();

    let column = match intent.column() {
        Some(column) if table.has_column(column) => Some(quote_ident(column)),
        Some(column) => return Err(TablecastError::unknown_column(&table.name, column)),
        None => None,
    };

    let statement = match (intent, column) {
        (Intent::NameSearch { .. } | Intent::Filter { .. }, Some(column)) => Statement::new(
            format!("SELECT * FROM {from} WHERE {column} ILIKE $1 LIMIT {limit}"),
            intent.parameter().into_iter().collect(),
        ),
        (Intent::TopN { .. }, Some(column)) => Statement::new(
            format!("SELECT * FROM {from} ORDER BY {column} DESC LIMIT {limit}"),
            Vec::new(),
        ),
        _ => Statement::new(format!("SELECT * FROM {from} LIMIT {limit}"), Vec::new()),
    };

    Ok(statement)
}
