//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout Tablecast.
//! All errors are structured and map to stable error codes and HTTP statuses.
//!
//! # Error Categories
//! - `SchemaDiscovery`: The top-level catalog enumeration failed at boot
//! - `TableNotFound`: A client named a table that is not in the catalog
//! - `QueryExecution`: The database rejected or failed a generated statement
//! - `UnknownColumn`: A column identifier was not on the table's allow-list
//! - `ConnectionFailed`: Database connection errors
//! - `InvalidInput`: Malformed input or missing required parameters
//! - `ConfigError`: Configuration errors

use thiserror::Error;

/// Main error type for Tablecast operations
#[derive(Error, Debug)]
pub enum TablecastError {
    /// Table enumeration failed (connection lost, insufficient privilege)
    #[error("Schema discovery failed: {0}")]
    SchemaDiscovery(String),

    /// Requested table is not present in the catalog
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    /// Statement execution failed; carries the driver's message
    #[error("Query execution failed: {0}")]
    QueryExecution(String),

    /// Column identifier is not part of the table's discovered columns
    #[error("Column '{column}' is not a column of table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Database connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid input or missing required parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TablecastError {
    /// Convert error to error code string
    ///
    /// Error codes are stable and suitable for programmatic handling.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaDiscovery(_) => "SCHEMA_DISCOVERY_FAILED",
            Self::TableNotFound(_) => "TABLE_NOT_FOUND",
            Self::QueryExecution(_) => "QUERY_FAILED",
            Self::UnknownColumn { .. } => "UNKNOWN_COLUMN",
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status code used when this error reaches a route handler
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::TableNotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            Self::ConnectionFailed(_) => 503,
            Self::SchemaDiscovery(_)
            | Self::QueryExecution(_)
            | Self::UnknownColumn { .. }
            | Self::ConfigError(_) => 500,
        }
    }

    /// Get human-readable error message
    ///
    /// Never contains credentials; connection errors are built from the
    /// driver message only.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Driver-level detail for errors that carry one
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::QueryExecution(detail) | Self::ConnectionFailed(detail) => Some(detail),
            _ => None,
        }
    }

    /// Create a schema discovery error
    pub fn schema_discovery(message: impl Into<String>) -> Self {
        Self::SchemaDiscovery(message.into())
    }

    /// Create a table-not-found error
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound(table.into())
    }

    /// Create a query execution error
    pub fn query_execution(message: impl Into<String>) -> Self {
        Self::QueryExecution(message.into())
    }

    /// Create an unknown-column error
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn { table: table.into(), column: column.into() }
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}

/// Result type alias for Tablecast operations
pub type Result<T> = std::result::Result<T, TablecastError>;
