use async_trait::async_trait;
use thiserror::Error;

use super::row::Row;

/// Read access to the warehouse catalog.
///
/// Statements use `?` placeholders; `args` are bound in order as string literals.
/// Implementations do no caching and no retries.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn query(&self, statement: &str, args: &[&str]) -> Result<Vec<Row>, SourceError>;

    /// First row of `query`, `None` when the result is empty. Extra rows are ignored.
    async fn query_one(&self, statement: &str, args: &[&str]) -> Result<Option<Row>, SourceError> {
        Ok(self.query(statement, args).await?.into_iter().next())
    }

    async fn ping(&self) -> Result<(), SourceError>;

    async fn close(&self) -> Result<(), SourceError>;
}

/// Every variant means the source could not answer; callers treat them alike.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("source returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("operation timed out")]
    Timeout,
    #[error("invalid source configuration: {0}")]
    Config(String),
}
