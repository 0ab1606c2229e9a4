use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/render/databases", get(handlers::databases))
        .route(
            "/api/render/schema/{database}/{table}",
            get(handlers::table_schema),
        )
        .route(
            "/api/render/database/{database}/schema",
            get(handlers::database_schema),
        )
        .route(
            "/api/render/database/{database}/stats",
            get(handlers::database_stats),
        )
        .route("/api/databases", get(handlers::catalog))
        .route("/api/table/{database}/{table}", get(handlers::table_details))
        .route(
            "/api/table/{database}/{table}/relationships",
            get(handlers::table_relationships),
        )
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
