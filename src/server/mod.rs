//! HTTP Server
//!
//! Axum router over an immutable [`Catalog`] and a [`QueryExecutor`].
//!
//! # Routes
//! - `GET  /api/tables`                  - table names
//! - `GET  /api/tables/{table}`          - table roles and columns
//! - `GET  /api/tables/{table}/columns`  - column listing
//! - `POST /api/query`                   - prompt to rows
//! - anything else                       - static files, falling back to `index.html`

use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::catalog::{discover, Catalog};
use crate::config::ServerConfig;
use crate::engine::postgres::PostgresEngine;
use crate::engine::{CatalogSource, QueryExecutor};

pub mod handlers;

use handlers::{describe_table, list_columns, list_tables, run_query};

/// Shared state for request handlers
pub struct AppState<E> {
    /// Built once at boot, read-only afterwards
    pub catalog: Arc<Catalog>,
    pub executor: E,
}

impl<E> AppState<E> {
    pub fn new(catalog: Catalog, executor: E) -> Self {
        Self { catalog: Arc::new(catalog), executor }
    }
}

/// Create the API router
///
/// With `static_dir` set, unmatched routes serve files from it and fall
/// back to its `index.html`.
pub fn create_router<E>(state: Arc<AppState<E>>, static_dir: Option<&Path>) -> Router
where
    E: QueryExecutor + Send + Sync + 'static,
{
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let router = Router::new()
        .route("/api/tables", get(list_tables::<E>))
        .route("/api/tables/{table}", get(describe_table::<E>))
        .route("/api/tables/{table}/columns", get(list_columns::<E>))
        .route("/api/query", post(run_query::<E>));

    let router = match static_dir {
        Some(dir) => {
            let spa = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
            router.fallback_service(spa)
        }
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).layer(cors).with_state(state)
}

/// Build the catalog from a schema source
///
/// Connection and discovery failures are logged and yield an empty
/// catalog, so the server still starts and answers "not found".
pub async fn load_catalog<S>(source: &S) -> Catalog
where
    S: CatalogSource + Sync,
{
    if let Err(e) = source.ping().await {
        tracing::error!(code = e.error_code(), error = %e, "Database connection error");
        return Catalog::empty();
    }
    tracing::info!("Database connected successfully");

    match discover(source).await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "Error loading database schema");
            Catalog::empty()
        }
    }
}

/// Connect, discover the schema, then serve until the listener fails
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;
    let addr = config.resolve_bind_addr().await?;

    let engine = PostgresEngine::new(&config.connection())?;
    let catalog = load_catalog(&engine).await;

    let stats = engine.pool().stats();
    tracing::info!(
        tables = catalog.len(),
        pool_idle = stats.idle,
        pool_in_use = stats.in_use,
        pool_max = stats.max_size,
        "Catalog ready"
    );

    let state = Arc::new(AppState::new(catalog, engine));
    let router = create_router(state, Some(config.static_dir.as_path()));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server running on {addr}");

    axum::serve(listener, router).await?;
    Ok(())
}
