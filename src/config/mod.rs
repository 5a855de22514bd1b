//! Configuration Management
//!
//! Server and database settings come from command-line flags, each of
//! which falls back to an environment variable and then a default.
//!
//! # Resolution Precedence
//! 1. Explicit flag (highest priority)
//! 2. Process environment
//! 3. `.env` file in the working directory (loaded by `main` before parsing)
//! 4. Built-in default
//!
//! # Environment Variables
//! `PORT`, `BIND_ADDRESS`, `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`,
//! `DB_NAME`, `DB_SCHEMA`, `DB_POOL_SIZE`, `STATIC_DIR`

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::engine::ConnectionConfig;
use crate::error::{Result, TablecastError};

/// Default HTTP listening port
pub const DEFAULT_PORT: u16 = 3000;

/// Tablecast - schema-discovering prompt-to-SQL HTTP API
#[derive(Parser, Clone)]
#[command(name = "tablecast")]
#[command(about = "Serve a PostgreSQL schema over HTTP and answer short prompts with bounded queries")]
#[command(version)]
pub struct ServerConfig {
    /// HTTP listening port
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// HTTP bind address
    #[arg(long = "bind", env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// PostgreSQL host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// PostgreSQL port
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    /// PostgreSQL user
    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    /// PostgreSQL password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = "postgres")]
    pub db_name: String,

    /// Schema to expose (defaults to the connection's current schema)
    #[arg(long, env = "DB_SCHEMA")]
    pub db_schema: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
    pub pool_size: usize,

    /// Directory of static files served for unmatched routes
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("bind_address", &self.bind_address)
            .field("database", &self.connection())
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

impl ServerConfig {
    /// Check values clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(TablecastError::config_error("DB_POOL_SIZE must be at least 1"));
        }
        if self.db_host.trim().is_empty() {
            return Err(TablecastError::config_error("DB_HOST must not be empty"));
        }
        if self.db_name.trim().is_empty() {
            return Err(TablecastError::config_error("DB_NAME must not be empty"));
        }
        if self.bind_address.trim().is_empty() {
            return Err(TablecastError::config_error("BIND_ADDRESS must not be empty"));
        }
        Ok(())
    }

    /// Address the HTTP listener binds to
    ///
    /// `BIND_ADDRESS` may be an IP literal or a host name such as
    /// `localhost`; names resolve to their first address.
    pub async fn resolve_bind_addr(&self) -> Result<SocketAddr> {
        let host = self.bind_address.trim();
        let invalid = |detail: String| {
            TablecastError::config_error(format!(
                "Invalid bind address '{host}:{}': {detail}",
                self.port
            ))
        };

        tokio::net::lookup_host((host, self.port))
            .await
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("no addresses found".to_string()))
    }

    /// Database connection parameters
    #[must_use]
    pub fn connection(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::postgres(
            self.db_host.clone(),
            self.db_port,
            self.db_user.clone(),
            self.db_password.clone(),
            self.db_name.clone(),
        );
        config.schema = self.db_schema.clone().filter(|s| !s.trim().is_empty());
        config.pool_size = self.pool_size;
        config
    }
}
