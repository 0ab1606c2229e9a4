pub use schemaflow_domain as domain;

pub mod aggregate;
pub mod cache;
pub mod ddl;
pub mod error;
pub mod extract;
pub mod ports;
pub mod service;
pub mod sql;
pub mod traversal;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
