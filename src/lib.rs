//! Tablecast - Prompt-to-SQL over a Discovered Schema
//!
//! Tablecast exposes a `PostgreSQL` schema over an HTTP JSON API and answers
//! short free-text prompts with bounded, parameterized queries. There is no
//! pre-declared query catalog: tables and columns are discovered at boot.
//!
//! # Core Principles
//! - Identifiers come from the discovered catalog, values are bound parameters
//! - Every generated query is bounded (`LIMIT 10` or `LIMIT 20`)
//! - Read-only: only `SELECT` statements are ever generated
//! - Deterministic behavior (identical inputs → identical statements)
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`output`] - JSON response bodies
//! - [`engine`] - Database seams, core metadata types and the `PostgreSQL` engine
//! - [`catalog`] - Schema discovery and the immutable catalog
//! - [`roles`] - Identifier and display column inference
//! - [`intent`] - Prompt matching rules
//! - [`query`] - Statement building
//! - [`config`] - Configuration from flags and environment
//! - [`server`] - HTTP routes

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod intent;
pub mod output;
pub mod query;
pub mod roles;
pub mod server;

// Re-export commonly used types for convenience
pub use catalog::{discover, Catalog};
pub use config::ServerConfig;
pub use engine::{
    CatalogSource, ColumnDescriptor, ConnectionConfig, DataType, QueryExecutor, Row,
    TableDescriptor,
};
pub use error::{Result, TablecastError};
pub use intent::{match_intent, Intent, Shape};
pub use output::{ColumnView, ErrorBody, TableView};
pub use query::{build, Statement};
pub use roles::infer_roles;
pub use server::{create_router, AppState};
