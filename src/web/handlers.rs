use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Serialize;
use serde_json::{Value, json};

use crate::app::cache::DatabaseIndex;
use crate::domain::{DatabaseStats, Relationship, TableDetails, TableSummary};
use crate::error::{ApiError, ApiResult};
use crate::query::SchemaFilters;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub schema: String,
}

#[derive(Debug, Serialize)]
pub struct DatabaseSchemaResponse {
    pub database: String,
    pub schema: String,
    pub filters: SchemaFilters,
}

fn require_table(database: &str, table: &str) -> ApiResult<()> {
    if database.trim().is_empty() || table.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "database and table parameters are required".to_string(),
        ));
    }
    Ok(())
}

fn require_database(database: &str) -> ApiResult<()> {
    if database.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "database parameter is required".to_string(),
        ));
    }
    Ok(())
}

pub async fn databases(State(state): State<Arc<AppState>>) -> ApiResult<Json<DatabaseIndex>> {
    Ok(Json(state.service.databases().await?))
}

pub async fn table_schema(
    State(state): State<Arc<AppState>>,
    Path((database, table)): Path<(String, String)>,
) -> ApiResult<Json<SchemaResponse>> {
    require_table(&database, &table)?;
    let schema = state.service.table_schema(&database, &table).await?;
    Ok(Json(SchemaResponse { schema }))
}

pub async fn database_schema(
    State(state): State<Arc<AppState>>,
    Path(database): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<DatabaseSchemaResponse>> {
    require_database(&database)?;
    let filters = SchemaFilters::from_pairs(params);
    let schema = state
        .service
        .database_schema(&database, &filters.options())
        .await?;
    Ok(Json(DatabaseSchemaResponse {
        database,
        schema,
        filters,
    }))
}

pub async fn database_stats(
    State(state): State<Arc<AppState>>,
    Path(database): Path<String>,
) -> ApiResult<Json<DatabaseStats>> {
    require_database(&database)?;
    Ok(Json(state.service.database_stats(&database).await?))
}

pub async fn table_details(
    State(state): State<Arc<AppState>>,
    Path((database, table)): Path<(String, String)>,
) -> ApiResult<Json<TableDetails>> {
    require_table(&database, &table)?;
    Ok(Json(state.service.table_details(&database, &table).await?))
}

pub async fn table_relationships(
    State(state): State<Arc<AppState>>,
    Path((database, table)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Relationship>>> {
    require_table(&database, &table)?;
    Ok(Json(
        state.service.table_relationships(&database, &table).await?,
    ))
}

pub async fn catalog(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BTreeMap<String, Vec<TableSummary>>>> {
    Ok(Json(state.service.catalog().await?))
}

pub async fn health(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    state
        .service
        .ping()
        .await
        .map_err(|e| ApiError::Internal(format!("metadata source unavailable: {e}")))?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}
