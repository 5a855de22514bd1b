//! Database Engine Traits and Core Types
//!
//! This module defines the core abstractions between the translation engine
//! and the database. The `PostgreSQL` implementation lives in [`postgres`].
//!
//! # Seams
//! - [`CatalogSource`] enumerates tables and columns for schema discovery.
//! - [`QueryExecutor`] runs a generated [`Statement`] and returns JSON rows.
//!
//! Both traits are implemented by [`postgres::PostgresEngine`]; tests
//! substitute in-memory fixtures.

use std::fmt;

use crate::error::Result;
use crate::query::Statement;

pub mod postgres;

/// Literal identifier column used when role inference found none
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "id";

/// Literal display column used when role inference found none
pub const DEFAULT_DISPLAY_COLUMN: &str = "name";

/// `information_schema` type text for extension, enum and composite types
const USER_DEFINED_TYPE: &str = "USER-DEFINED";

/// One result row, keyed by column name
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Connection parameters for the `PostgreSQL` server
#[derive(Clone)]
pub struct ConnectionConfig {
    pub host: String,

    pub port: u16,

    pub user: String,

    /// WARNING: Sensitive data, do not log or include in error messages
    pub password: Option<String>,

    /// Database name
    pub database: String,

    /// Schema to discover; `None` means the connection's `current_schema()`
    pub schema: Option<String>,

    /// Maximum number of pooled connections
    pub pool_size: usize,
}

impl ConnectionConfig {
    /// Create a new `PostgreSQL` connection config with a pool of 10
    #[must_use]
    pub fn postgres(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: Option<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password,
            database: database.into(),
            schema: None,
            pool_size: 10,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Normalized column type family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Numeric,
    Text,
    Boolean,
    Timestamp,
    Date,
    Time,
    Uuid,
    Json,
    Binary,
    Other,
}

impl DataType {
    /// Normalize a type name as reported by `information_schema.columns.data_type`
    #[must_use]
    pub fn from_reported(reported: &str) -> Self {
        let lowered = reported.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "smallint" | "integer" | "bigint" | "int2" | "int4" | "int8" | "smallserial"
            | "serial" | "bigserial" => Self::Integer,
            "numeric" | "decimal" | "real" | "double precision" | "float4" | "float8"
            | "money" => Self::Numeric,
            "boolean" | "bool" => Self::Boolean,
            "date" => Self::Date,
            "uuid" => Self::Uuid,
            "json" | "jsonb" => Self::Json,
            "bytea" => Self::Binary,
            "text" | "citext" | "name" | "bpchar" | "varchar" | "char" => Self::Text,
            s if s.starts_with("character") => Self::Text,
            s if s.starts_with("timestamp") => Self::Timestamp,
            s if s.starts_with("time") => Self::Time,
            _ => Self::Other,
        }
    }

    /// Whether this is a character/text family type
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

/// Column metadata discovered from the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name, unique within its table
    pub name: String,

    /// Normalized type family
    pub data_type: DataType,

    /// Type text exactly as the engine reported it
    pub reported_type: String,

    /// Default value is a sequence generator (`nextval(...)`)
    pub has_auto_default: bool,
}

impl ColumnDescriptor {
    /// Build a descriptor from the raw `information_schema` fields
    pub fn new(
        name: impl Into<String>,
        reported_type: impl Into<String>,
        default_expr: Option<&str>,
    ) -> Self {
        let reported_type = reported_type.into();
        Self {
            name: name.into(),
            data_type: DataType::from_reported(&reported_type),
            reported_type,
            has_auto_default: default_expr.is_some_and(is_sequence_default),
        }
    }

    /// Classify extension and enum columns by their underlying type name
    ///
    /// `information_schema` reports these as `USER-DEFINED`; `udt_name`
    /// carries the actual type (e.g. `citext`). `reported_type` is unchanged.
    #[must_use]
    pub fn with_udt_name(mut self, udt_name: &str) -> Self {
        if self.reported_type.eq_ignore_ascii_case(USER_DEFINED_TYPE) {
            self.data_type = DataType::from_reported(udt_name);
        }
        self
    }
}

/// Whether a column default expression draws from a sequence
fn is_sequence_default(expr: &str) -> bool {
    expr.contains("nextval")
}

/// Table metadata with inferred roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Table name, unique key in the catalog
    pub name: String,

    /// Columns in physical ordinal order
    pub columns: Vec<ColumnDescriptor>,

    /// Column inferred as the row identifier
    pub identifier_column: Option<String>,

    /// Column inferred as the human-readable name
    pub display_column: Option<String>,
}

impl TableDescriptor {
    /// Create a descriptor with no roles assigned
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self { name: name.into(), columns, identifier_column: None, display_column: None }
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Identifier column, or the literal `"id"` when none was inferred
    #[must_use]
    pub fn identifier_or_default(&self) -> &str {
        self.identifier_column.as_deref().unwrap_or(DEFAULT_IDENTIFIER_COLUMN)
    }

    /// Display column, or the literal `"name"` when none was inferred
    #[must_use]
    pub fn display_or_default(&self) -> &str {
        self.display_column.as_deref().unwrap_or(DEFAULT_DISPLAY_COLUMN)
    }
}

/// Source of schema metadata for catalog discovery
///
/// `list_tables` failing aborts discovery; `list_columns` failing only
/// drops the affected table.
pub trait CatalogSource {
    /// Round-trip check run before discovery
    fn ping(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Names of the discoverable base tables
    fn list_tables(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Columns of one table in ordinal order
    fn list_columns(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ColumnDescriptor>>> + Send;
}

/// Runs generated statements
///
/// Implementations bind `statement.params` as parameters and fail with
/// `TablecastError::QueryExecution` carrying the driver message.
pub trait QueryExecutor {
    fn execute(
        &self,
        statement: &Statement,
    ) -> impl std::future::Future<Output = Result<Vec<Row>>> + Send;
}
