//! HTTP Request Handlers
//!
//! Every handler answers with JSON; failures become an [`ApiError`] whose
//! body is an [`ErrorBody`].

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::engine::{QueryExecutor, Row};
use crate::error::TablecastError;
use crate::intent::match_intent;
use crate::output::{ColumnView, ErrorBody, TableView};
use crate::query::build;
use crate::server::AppState;

/// Body of `POST /api/query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Table name
    #[serde(default)]
    pub category: String,

    /// Free-text prompt
    #[serde(default)]
    pub prompt: String,
}

/// Error response: status plus JSON body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, body: ErrorBody) -> Self {
        Self { status, body }
    }

    /// 400 naming the requested table, used by `POST /api/query`
    fn unknown_category(err: &TablecastError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorBody::new(err.message()))
    }
}

impl From<TablecastError> for ApiError {
    fn from(err: TablecastError) -> Self {
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &err {
            TablecastError::TableNotFound(_) => ErrorBody::new("Table not found"),
            TablecastError::InvalidInput(_) => ErrorBody::new(err.message()),
            _ => {
                let details = err.detail().map_or_else(|| err.message(), str::to_string);
                ErrorBody::with_details("Database error", details)
            }
        };

        Self::new(status, body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), ErrorBody::new(rejection.body_text()))
    }
}

/// `GET /api/tables`
pub async fn list_tables<E>(State(state): State<Arc<AppState<E>>>) -> Json<Vec<String>> {
    Json(state.catalog.table_names().map(str::to_string).collect())
}

/// `GET /api/tables/{table}`
pub async fn describe_table<E>(
    State(state): State<Arc<AppState<E>>>,
    Path(table): Path<String>,
) -> Result<Json<TableView>, ApiError> {
    let table = state.catalog.require(&table)?;
    Ok(Json(TableView::from(table)))
}

/// `GET /api/tables/{table}/columns`
pub async fn list_columns<E>(
    State(state): State<Arc<AppState<E>>>,
    Path(table): Path<String>,
) -> Result<Json<Vec<ColumnView>>, ApiError> {
    let table = state.catalog.require(&table)?;
    Ok(Json(table.columns.iter().map(ColumnView::from).collect()))
}

/// `POST /api/query`
pub async fn run_query<E>(
    State(state): State<Arc<AppState<E>>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Vec<Row>>, ApiError>
where
    E: QueryExecutor + Send + Sync + 'static,
{
    let Json(request) = payload?;

    let table = state.catalog.require(&request.category).map_err(|e| {
        tracing::debug!(code = e.error_code(), category = %request.category, "Unknown category");
        ApiError::unknown_category(&e)
    })?;

    let intent = match_intent(table, &request.prompt);
    let statement = build(table, &intent).map_err(|e| {
        tracing::error!(
            table = %table.name,
            code = e.error_code(),
            error = %e,
            "Failed to build query"
        );
        ApiError::from(e)
    })?;

    tracing::info!(
        table = %table.name,
        shape = intent.shape().as_str(),
        params = statement.params.len(),
        "Executing query"
    );
    tracing::debug!(sql = %statement.sql, params = ?statement.params, "Statement");

    let rows = state.executor.execute(&statement).await.map_err(|e| {
        tracing::error!(
            table = %table.name,
            code = e.error_code(),
            error = %e,
            "Error executing query"
        );
        ApiError::from(e)
    })?;

    Ok(Json(rows))
}
