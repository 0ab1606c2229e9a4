pub use schemaflow_app as app;
pub use schemaflow_domain as domain;
pub use schemaflow_infra as infra;
pub use schemaflow_web as web;

pub mod error;
