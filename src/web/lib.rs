pub use schemaflow_app as app;
pub use schemaflow_domain as domain;

pub mod error;
pub mod handlers;
pub mod query;
pub mod router;
pub mod state;

pub use router::router;
pub use state::AppState;
