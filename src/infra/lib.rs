pub use schemaflow_app as app;
pub use schemaflow_domain as domain;

pub mod adapters;
pub mod config;
pub mod export;
