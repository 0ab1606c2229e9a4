use thiserror::Error;

use crate::ports::SourceError;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("metadata source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),
    #[error("{0} not found")]
    NotFound(String),
}

impl CacheError {
    pub fn table_not_found(database: &str, table: &str) -> Self {
        Self::NotFound(format!("table '{database}.{table}'"))
    }

    pub fn database_not_found(database: &str) -> Self {
        Self::NotFound(format!("database '{database}'"))
    }
}
