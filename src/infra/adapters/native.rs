//! `MetadataSource` over the ClickHouse native protocol.

use async_trait::async_trait;
use clickhouse_rs::errors::Error as ClickHouseError;
use clickhouse_rs::types::{Block, Complex, SqlType};
use clickhouse_rs::Pool;
use tracing::{debug, warn};

use super::redact::redact_credentials;
use crate::app::ports::{Field, MetadataSource, Row, SourceError};
use crate::app::sql::bind_args;
use crate::config::ClickHouseSettings;

pub struct NativeSource {
    pool: Pool,
}

impl NativeSource {
    /// The pool connects lazily; the first query or ping opens a connection.
    pub fn new(settings: &ClickHouseSettings) -> Result<Self, SourceError> {
        if settings.tls.has_client_certificate() {
            warn!("Client certificates are not supported by the native transport; ignoring them");
        }
        Ok(Self {
            pool: Pool::new(connection_url(settings)),
        })
    }
}

fn connection_url(settings: &ClickHouseSettings) -> String {
    let mut url = format!(
        "tcp://{}:{}@{}:{}/{}",
        urlencoding::encode(&settings.user),
        urlencoding::encode(&settings.password),
        settings.host,
        settings.port(),
        urlencoding::encode(&settings.database)
    );
    if settings.tls.enabled {
        url.push_str("?secure=true");
        if settings.tls.skip_verify {
            url.push_str("&skip_verify=true");
        }
    }
    url
}

fn source_error(error: ClickHouseError) -> SourceError {
    let message = redact_credentials(&error.to_string());
    match error {
        ClickHouseError::Server(_) => SourceError::Query(message),
        ClickHouseError::FromSql(_) => SourceError::Malformed(message),
        ClickHouseError::Url(_) => SourceError::Config(message),
        _ => SourceError::Connection(message),
    }
}

fn rows_from_block(block: &Block<Complex>) -> Result<Vec<Row>, SourceError> {
    let types: Vec<SqlType> = block.columns().iter().map(|c| c.sql_type()).collect();
    block
        .rows()
        .map(|row| {
            types
                .iter()
                .enumerate()
                .map(|(index, sql_type)| field_at(&row, index, sql_type))
                .collect::<Result<Vec<_>, _>>()
                .map(Row::new)
        })
        .collect()
}

fn field_at(
    row: &clickhouse_rs::types::Row<'_, Complex>,
    index: usize,
    sql_type: &SqlType,
) -> Result<Field, SourceError> {
    let field = match sql_type {
        SqlType::String => Field::Text(row.get::<String, _>(index).map_err(source_error)?),
        SqlType::UInt8 => Field::UInt(u64::from(row.get::<u8, _>(index).map_err(source_error)?)),
        SqlType::UInt16 => Field::UInt(u64::from(row.get::<u16, _>(index).map_err(source_error)?)),
        SqlType::UInt32 => Field::UInt(u64::from(row.get::<u32, _>(index).map_err(source_error)?)),
        SqlType::UInt64 => Field::UInt(row.get::<u64, _>(index).map_err(source_error)?),
        SqlType::Nullable(SqlType::UInt64) => {
            Field::from(row.get::<Option<u64>, _>(index).map_err(source_error)?)
        }
        SqlType::Nullable(SqlType::String) => row
            .get::<Option<String>, _>(index)
            .map_err(source_error)?
            .map_or(Field::Null, Field::Text),
        SqlType::Array(SqlType::String) => {
            Field::Array(row.get::<Vec<String>, _>(index).map_err(source_error)?)
        }
        other => {
            return Err(SourceError::Malformed(format!(
                "column {index}: unsupported type {other:?}"
            )));
        }
    };
    Ok(field)
}

#[async_trait]
impl MetadataSource for NativeSource {
    async fn query(&self, statement: &str, args: &[&str]) -> Result<Vec<Row>, SourceError> {
        let sql = bind_args(statement, args)?;
        let mut handle = self.pool.get_handle().await.map_err(source_error)?;
        let block = handle.query(sql).fetch_all().await.map_err(source_error)?;
        debug!(rows = block.row_count(), "Native query returned");
        rows_from_block(&block)
    }

    async fn ping(&self) -> Result<(), SourceError> {
        let mut handle = self.pool.get_handle().await.map_err(source_error)?;
        handle.ping().await.map_err(source_error)
    }

    async fn close(&self) -> Result<(), SourceError> {
        debug!("Releasing native connection pool");
        Ok(())
    }
}
