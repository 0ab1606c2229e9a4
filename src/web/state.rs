use crate::app::service::SchemaService;

/// Shared by every handler behind an `Arc`.
pub struct AppState {
    pub service: SchemaService,
}

impl AppState {
    pub fn new(service: SchemaService) -> Self {
        Self { service }
    }
}
