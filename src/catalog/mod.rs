//! Schema Catalog
//!
//! The catalog maps table names to [`TableDescriptor`]s. It is built once by
//! [`discover`] before the HTTP router starts and is immutable afterwards;
//! request handlers share it through an `Arc`.
//!
//! # Failure Model
//! - The table enumeration failing is fatal to discovery (`SchemaDiscovery`).
//! - One table's columns failing to load drops only that table.
//! - A table that reports no columns is kept with an empty column list.

use std::collections::BTreeMap;

use crate::engine::{CatalogSource, TableDescriptor};
use crate::error::{Result, TablecastError};
use crate::roles::infer_roles;

/// Name prefixes reserved for the database's own catalogs
const RESERVED_PREFIXES: &[&str] = &["pg_"];

/// Reserved names excluded regardless of prefix
const RESERVED_NAMES: &[&str] = &["information_schema"];

/// Immutable mapping from table name to table metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tables: BTreeMap<String, TableDescriptor>,
}

impl Catalog {
    /// An empty catalog, served while the database is unreachable
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from descriptors, inferring roles for each table
    ///
    /// Later descriptors with a duplicate name replace earlier ones.
    pub fn from_tables(tables: impl IntoIterator<Item = TableDescriptor>) -> Self {
        let tables = tables
            .into_iter()
            .map(infer_roles)
            .map(|table| (table.name.clone(), table))
            .collect();
        Self { tables }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(name)
    }

    /// Look up a table, failing with `TableNotFound`
    pub fn require(&self, name: &str) -> Result<&TableDescriptor> {
        self.get(name).ok_or_else(|| TablecastError::table_not_found(name))
    }

    /// Table names in sorted order
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Whether a table name belongs to the database's own catalogs
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name) || RESERVED_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Run a full discovery pass against `source`
pub async fn discover<S>(source: &S) -> Result<Catalog>
where
    S: CatalogSource + Sync,
{
    let names = source.list_tables().await.map_err(|e| match e {
        TablecastError::SchemaDiscovery(_) => e,
        other => TablecastError::schema_discovery(other.message()),
    })?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        if is_reserved(&name) {
            tracing::debug!(table = %name, "Skipping reserved table");
            continue;
        }

        match source.list_columns(&name).await {
            Ok(columns) => {
                if columns.is_empty() {
                    tracing::debug!(table = %name, "Table has no readable columns");
                }
                tables.push(TableDescriptor::new(name, columns));
            }
            Err(e) => {
                tracing::warn!(table = %name, error = %e, "Omitting table from catalog");
            }
        }
    }

    let catalog = Catalog::from_tables(tables);
    tracing::info!(tables = catalog.len(), "Database schema information loaded");
    Ok(catalog)
}
