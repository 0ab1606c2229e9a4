pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use schemaflow::app::cache::{CacheConfig, TableCache};
use schemaflow::app::service::SchemaService;
use schemaflow::app::test_support::FakeSource;
use schemaflow::infra::export::MermaidRenderer;
use schemaflow::web::{AppState, router};

pub fn create_test_app(source: &Arc<FakeSource>) -> Router {
    create_test_app_with(source, CacheConfig::default())
}

pub fn create_test_app_with(source: &Arc<FakeSource>, config: CacheConfig) -> Router {
    let cache = Arc::new(TableCache::new(Arc::clone(source) as _, config));
    let service = SchemaService::new(
        cache,
        Arc::clone(source) as _,
        Arc::new(MermaidRenderer::new()),
    );
    router(Arc::new(AppState::new(service)))
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}
