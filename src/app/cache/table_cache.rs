use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock};
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};

use super::config::CacheConfig;
use super::generation::{CacheGeneration, DatabaseIndex};
use crate::domain::{Edge, QualifiedName, TableSnapshot};
use crate::error::CacheError;
use crate::ports::{MetadataSource, Row, SourceError};
use crate::sql::quote_literal;

/// Column list of the bulk `system.tables` query, in row order.
pub const TABLES_QUERY_COLUMNS: &str = "database, name, engine, engine_full, create_table_query, \
     total_rows, total_bytes, loading_dependencies_database, loading_dependencies_table";

/// Single-writer, multi-reader catalog cache.
///
/// Readers clone the current generation pointer under a short read lock and
/// work against that generation for the rest of their request. A refresh
/// queries and builds a candidate generation with no lock held, then takes
/// the write lock only to swap the pointer. At most one refresh runs at a time,
/// and callers that queued behind an attempt share its outcome, failed or not.
pub struct TableCache {
    source: Arc<dyn MetadataSource>,
    config: CacheConfig,
    current: RwLock<Option<Arc<CacheGeneration>>>,
    /// Error of the most recent attempt, `None` once one succeeds.
    refresh: Mutex<Option<CacheError>>,
    /// Completed refresh attempts. Only advanced while `refresh` is held.
    attempts: AtomicU64,
    generations: AtomicU64,
}

impl TableCache {
    pub fn new(source: Arc<dyn MetadataSource>, config: CacheConfig) -> Self {
        Self {
            source,
            config,
            current: RwLock::new(None),
            refresh: Mutex::new(None),
            attempts: AtomicU64::new(0),
            generations: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The current generation, fresh or not, without any I/O.
    pub async fn snapshot(&self) -> Option<Arc<CacheGeneration>> {
        self.current.read().await.clone()
    }

    async fn fresh_snapshot(&self) -> Option<Arc<CacheGeneration>> {
        self.snapshot()
            .await
            .filter(|generation| !generation.is_expired(self.config.ttl))
    }

    /// Returns the current generation if within TTL, otherwise refreshes.
    /// A failed refresh leaves the previous generation in place and returns the error.
    pub async fn ensure_fresh(&self) -> Result<Arc<CacheGeneration>, CacheError> {
        if let Some(generation) = self.fresh_snapshot().await {
            return Ok(generation);
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let mut last_failure = self.refresh.lock().await;
        if let Some(generation) = self.fresh_snapshot().await {
            debug!(generation = generation.id(), "Refresh completed by a concurrent caller");
            return Ok(generation);
        }
        if self.attempts.load(Ordering::Acquire) != seen
            && let Some(e) = last_failure.as_ref()
        {
            debug!(error = %e, "Concurrent refresh failed, sharing its error");
            return Err(e.clone());
        }

        info!("Refreshing table cache");
        let started = Instant::now();
        let loaded = self.load().await;
        self.attempts.fetch_add(1, Ordering::Release);
        let generation = match loaded {
            Ok(generation) => {
                *last_failure = None;
                Arc::new(generation)
            }
            Err(e) => {
                warn!(error = %e, "Table cache refresh failed");
                *last_failure = Some(e.clone());
                return Err(e);
            }
        };

        *self.current.write().await = Some(Arc::clone(&generation));
        info!(
            generation = generation.id(),
            tables = generation.table_count(),
            databases = generation.databases().len(),
            edges = generation.edges().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Table cache refreshed"
        );
        Ok(generation)
    }

    /// Like `ensure_fresh`, but a failed refresh on a warm cache serves the
    /// previous generation. Only a cold cache surfaces the error.
    pub async fn generation(&self) -> Result<Arc<CacheGeneration>, CacheError> {
        match self.ensure_fresh().await {
            Ok(generation) => Ok(generation),
            Err(e) => match self.snapshot().await {
                Some(stale) => {
                    warn!(generation = stale.id(), error = %e, "Serving stale table cache");
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }

    pub async fn get(&self, database: &str, table: &str) -> Result<TableSnapshot, CacheError> {
        let generation = self
            .snapshot()
            .await
            .ok_or_else(|| CacheError::table_not_found(database, table))?;
        generation.get(database, table).cloned()
    }

    pub async fn list_databases(&self) -> DatabaseIndex {
        self.snapshot()
            .await
            .map(|generation| generation.databases().clone())
            .unwrap_or_default()
    }

    pub async fn edges(&self) -> Vec<Edge> {
        self.snapshot()
            .await
            .map(|generation| generation.edges().to_vec())
            .unwrap_or_default()
    }

    pub fn tables_query(&self) -> String {
        let excluded: Vec<String> = self
            .config
            .denylist
            .iter()
            .filter(|database| !database.is_empty())
            .map(|database| quote_literal(database))
            .collect();

        if excluded.is_empty() {
            format!("SELECT {TABLES_QUERY_COLUMNS} FROM system.tables ORDER BY database, name")
        } else {
            format!(
                "SELECT {TABLES_QUERY_COLUMNS} FROM system.tables WHERE database NOT IN ({}) ORDER BY database, name",
                excluded.join(", ")
            )
        }
    }

    async fn load(&self) -> Result<CacheGeneration, CacheError> {
        let statement = self.tables_query();
        let rows = timeout(self.config.refresh_timeout, self.source.query(&statement, &[]))
            .await
            .map_err(|_| SourceError::Timeout)??;

        let tables = rows
            .iter()
            .map(snapshot_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let id = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CacheGeneration::build(id, tables, &self.config))
    }
}

fn snapshot_from_row(row: &Row) -> Result<TableSnapshot, SourceError> {
    let name = QualifiedName::new(row.text(0)?, row.text(1)?);
    let dependency_databases = row.strings(7)?;
    let dependency_tables = row.strings(8)?;
    let dependencies = dependency_databases
        .into_iter()
        .zip(dependency_tables)
        .map(|(database, table)| QualifiedName::new(database, table))
        .collect();

    Ok(TableSnapshot::new(name, row.text(2)?)
        .with_engine_full(row.text(3)?)
        .with_create_query(row.text(4)?)
        .with_rows(row.opt_u64(5)?)
        .with_bytes(row.opt_u64(6)?)
        .with_dependencies(dependencies))
}
