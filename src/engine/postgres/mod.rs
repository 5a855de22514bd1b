//! `PostgreSQL` Database Engine Implementation
//!
//! This module implements [`CatalogSource`] and [`QueryExecutor`] for `PostgreSQL`.
//!
//! # Features
//! - Client-server connections via TCP, pooled (see [`pool`])
//! - Schema introspection via `information_schema`
//! - Parameter-bound execution of generated statements
//! - Rich type system support (JSON/JSONB, numerics, timestamps, arrays, etc.)
//!
//! # Implementation Notes
//! - Uses `tokio-postgres` (async driver, requires tokio runtime)
//! - Column values are decoded by [`value::SqlValue`]; unsupported types
//!   fail the query rather than producing a mangled value
//! - An unset schema means the connection's `current_schema()`

use serde_json::Value;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Config, Row as PgRow};

use crate::engine::{CatalogSource, ColumnDescriptor, ConnectionConfig, QueryExecutor, Row};
use crate::error::{Result, TablecastError};
use crate::query::Statement;

pub mod pool;
pub mod value;

pub use pool::{PgPool, PoolStats, PooledClient};
pub use value::SqlValue;

/// `PostgreSQL` engine bound to one database and schema
#[derive(Clone)]
pub struct PostgresEngine {
    pool: PgPool,
    /// `None` resolves to the connection's `current_schema()` in each query
    schema: Option<String>,
}

impl PostgresEngine {
    /// Build the engine and its (still empty) pool; performs no I/O
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let pg_config = build_pg_config(config)?;
        let pool = PgPool::new(pg_config, config.pool_size)?;
        Ok(Self { pool, schema: config.schema.clone() })
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl CatalogSource for PostgresEngine {
    async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let client = self.pool.acquire().await.map_err(|e| {
            TablecastError::schema_discovery(format!("Could not acquire connection: {e}"))
        })?;

        let query = "
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = COALESCE($1::text, current_schema())
            AND table_type = 'BASE TABLE'
            ORDER BY table_name";

        let rows = client.query(query, &[&self.schema]).await.map_err(|e| {
            TablecastError::schema_discovery(format!(
                "Failed to list tables: {}",
                driver_message(&e)
            ))
        })?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let client = self.pool.acquire().await?;

        let query = "
            SELECT column_name::text, data_type::text, udt_name::text, column_default::text
            FROM information_schema.columns
            WHERE table_schema = COALESCE($1::text, current_schema())
            AND table_name::text = $2
            ORDER BY ordinal_position";

        let rows = client.query(query, &[&self.schema, &table]).await.map_err(|e| {
            TablecastError::schema_discovery(format!(
                "Failed to query columns for {table}: {}",
                driver_message(&e)
            ))
        })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.get(0);
            let data_type: String = row.get(1);
            let udt_name: String = row.get(2);
            let default: Option<String> = row.get(3);
            columns.push(
                ColumnDescriptor::new(name, data_type, default.as_deref()).with_udt_name(&udt_name),
            );
        }

        Ok(columns)
    }
}

impl QueryExecutor for PostgresEngine {
    async fn execute(&self, statement: &Statement) -> Result<Vec<Row>> {
        let client = self.pool.acquire().await?;

        let params: Vec<&(dyn ToSql + Sync)> =
            statement.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let rows = client
            .query(statement.sql.as_str(), &params)
            .await
            .map_err(|e| TablecastError::query_execution(driver_message(&e)))?;

        rows.iter().map(row_to_json).collect()
    }
}

/// Build `tokio-postgres` config from `ConnectionConfig`
fn build_pg_config(config: &ConnectionConfig) -> Result<Config> {
    if config.host.trim().is_empty() {
        return Err(TablecastError::invalid_input("PostgreSQL requires 'host' parameter"));
    }
    if config.user.trim().is_empty() {
        return Err(TablecastError::invalid_input("PostgreSQL requires 'user' parameter"));
    }
    if config.database.trim().is_empty() {
        return Err(TablecastError::invalid_input("PostgreSQL requires 'database' parameter"));
    }

    let mut pg_config = Config::new();
    pg_config
        .host(&config.host)
        .port(config.port)
        .user(&config.user)
        .dbname(&config.database)
        .application_name("tablecast");

    if let Some(password) = &config.password {
        pg_config.password(password);
    }

    Ok(pg_config)
}

/// The server's message for database errors, the driver's description otherwise
fn driver_message(err: &tokio_postgres::Error) -> String {
    err.as_db_error().map_or_else(|| err.to_string(), |db| db.message().to_string())
}

/// Convert a `PostgreSQL` row to a column-keyed JSON object
fn row_to_json(row: &PgRow) -> Result<Row> {
    let mut object = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = row.try_get::<_, Option<SqlValue>>(idx).map_err(|e| {
            TablecastError::query_execution(format!(
                "Failed to decode column '{}' of type {}: {e}",
                column.name(),
                column.type_()
            ))
        })?;
        object.insert(column.name().to_string(), value.map_or(Value::Null, SqlValue::into_json));
    }
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::discover;
    use crate::intent::match_intent;
    use crate::query::build;

    fn local_config() -> ConnectionConfig {
        ConnectionConfig::postgres(
            "localhost",
            5432,
            "postgres",
            Some("postgres".to_string()),
            "postgres",
        )
    }

    #[test]
    fn test_build_pg_config() {
        let config = local_config();
        let pg_config = build_pg_config(&config).unwrap();
        assert_eq!(pg_config.get_dbname(), Some("postgres"));
        assert_eq!(pg_config.get_user(), Some("postgres"));
        assert_eq!(pg_config.get_ports(), &[5432]);
    }

    #[test]
    fn test_build_pg_config_without_password() {
        let mut config = local_config();
        config.password = None;
        let pg_config = build_pg_config(&config).unwrap();
        assert!(pg_config.get_password().is_none());
    }

    #[test]
    fn test_missing_database_error() {
        let mut config = local_config();
        config.database = String::new();

        let error = build_pg_config(&config).unwrap_err();
        assert!(error.message().contains("PostgreSQL requires 'database' parameter"));
    }

    #[test]
    fn test_missing_host_error() {
        let mut config = local_config();
        config.host = "  ".to_string();

        let error = build_pg_config(&config).unwrap_err();
        assert!(error.message().contains("PostgreSQL requires 'host' parameter"));
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_discover_and_query_live_database() {
        let engine = PostgresEngine::new(&local_config()).unwrap();
        engine.ping().await.unwrap();
        let setup = engine.pool().acquire().await.unwrap();
        setup
            .batch_execute(
                "DROP TABLE IF EXISTS tablecast_profiles;
                 CREATE TABLE tablecast_profiles (
                     id SERIAL PRIMARY KEY,
                     display_name VARCHAR(100) NOT NULL,
                     platform TEXT,
                     follower_count INTEGER
                 );
                 INSERT INTO tablecast_profiles (display_name, platform, follower_count) VALUES
                     ('John Smith', 'TikTok', 1200),
                     ('Jane Doe', 'Instagram', 5400);",
            )
            .await
            .unwrap();
        drop(setup);

        let catalog = discover(&engine).await.unwrap();
        let table = catalog.get("tablecast_profiles").unwrap();
        assert_eq!(table.identifier_column.as_deref(), Some("id"));
        assert_eq!(table.display_column.as_deref(), Some("display_name"));

        let intent = match_intent(table, "platform tiktok");
        let rows = engine.execute(&build(table, &intent).unwrap()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["display_name"], "John Smith");

        let intent = match_intent(table, "top profiles");
        let rows = engine.execute(&build(table, &intent).unwrap()).await.unwrap();
        assert_eq!(rows[0]["follower_count"], 5400);
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_execution_error_carries_driver_message() {
        let engine = PostgresEngine::new(&local_config()).unwrap();
        let statement = Statement::new("SELECT missing_column FROM pg_class LIMIT 1", Vec::new());

        let error = engine.execute(&statement).await.unwrap_err();
        assert!(matches!(error, TablecastError::QueryExecution(_)));
        assert!(error.message().contains("missing_column"));
    }
}
