//! Request-level operations over the table cache.
//!
//! Every read obtains one generation up front and answers entirely from it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use crate::aggregate::stats_for;
use crate::cache::{CacheGeneration, DatabaseIndex, TableCache};
use crate::ddl::format_create_query;
use crate::domain::{Column, DatabaseStats, Relationship, TableDetails, TableSummary};
use crate::error::CacheError;
use crate::ports::{DiagramRenderer, MetadataSource, Row, SourceError};
use crate::traversal::{DatabaseSchemaOptions, relationships_for, schema_for, schema_for_database};

pub const COLUMNS_QUERY: &str = "SELECT name, type, position, comment FROM system.columns \
     WHERE database = ? AND table = ? ORDER BY position";

pub struct SchemaService {
    cache: Arc<TableCache>,
    source: Arc<dyn MetadataSource>,
    renderer: Arc<dyn DiagramRenderer>,
    query_timeout: Duration,
}

impl SchemaService {
    pub fn new(
        cache: Arc<TableCache>,
        source: Arc<dyn MetadataSource>,
        renderer: Arc<dyn DiagramRenderer>,
    ) -> Self {
        let query_timeout = cache.config().refresh_timeout;
        Self {
            cache,
            source,
            renderer,
            query_timeout,
        }
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    async fn generation(&self) -> Result<Arc<CacheGeneration>, CacheError> {
        self.cache.generation().await
    }

    pub async fn databases(&self) -> Result<DatabaseIndex, CacheError> {
        Ok(self.generation().await?.databases().clone())
    }

    /// Database name to its tables, both sorted by name.
    pub async fn catalog(&self) -> Result<BTreeMap<String, Vec<TableSummary>>, CacheError> {
        let generation = self.generation().await?;
        let mut tables: Vec<_> = generation.tables().collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));

        let mut catalog: BTreeMap<String, Vec<TableSummary>> = BTreeMap::new();
        for table in tables {
            catalog
                .entry(table.name.database.clone())
                .or_default()
                .push(TableSummary::from(table));
        }
        Ok(catalog)
    }

    pub async fn table_schema(&self, database: &str, table: &str) -> Result<String, CacheError> {
        let generation = self.generation().await?;
        let diagram = schema_for(&generation, database, table)?;
        debug!(database, table, edges = diagram.edges.len(), "Rendering table schema");
        Ok(self.renderer.render_table(&diagram))
    }

    pub async fn database_schema(
        &self,
        database: &str,
        options: &DatabaseSchemaOptions,
    ) -> Result<String, CacheError> {
        let generation = self.generation().await?;
        let diagram = schema_for_database(&generation, database, options)?;
        debug!(
            database,
            nodes = diagram.nodes.len(),
            edges = diagram.edges.len(),
            "Rendering database schema"
        );
        Ok(self.renderer.render_database(&diagram))
    }

    pub async fn database_stats(&self, database: &str) -> Result<DatabaseStats, CacheError> {
        let generation = self.generation().await?;
        Ok(stats_for(&generation, database))
    }

    pub async fn table_relationships(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<Relationship>, CacheError> {
        let generation = self.generation().await?;
        relationships_for(&generation, database, table)
    }

    /// Cached table facts plus columns queried live from the source.
    pub async fn table_details(
        &self,
        database: &str,
        table: &str,
    ) -> Result<TableDetails, CacheError> {
        let generation = self.generation().await?;
        let snapshot = generation.get(database, table)?;

        let rows = timeout(
            self.query_timeout,
            self.source.query(COLUMNS_QUERY, &[database, table]),
        )
        .await
        .map_err(|_| SourceError::Timeout)??;
        let columns = rows
            .iter()
            .map(column_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TableDetails::new(
            snapshot,
            columns,
            format_create_query(&snapshot.create_query),
        ))
    }

    pub async fn ping(&self) -> Result<(), SourceError> {
        self.source.ping().await
    }
}

fn column_from_row(row: &Row) -> Result<Column, SourceError> {
    Ok(Column::new(row.text(0)?, row.text(1)?, row.u64(2)?).with_comment(row.text(3)?))
}
