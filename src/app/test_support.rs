//! Scripted `MetadataSource` for tests across the workspace.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{Field, MetadataSource, Row, SourceError};

/// Builder for one `system.tables` row in bulk-query column order.
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    database: String,
    name: String,
    engine: String,
    engine_full: String,
    create_query: String,
    rows: Option<u64>,
    bytes: Option<u64>,
    dependencies: Vec<(String, String)>,
}

impl TableRow {
    pub fn new(database: &str, name: &str, engine: &str) -> Self {
        Self {
            database: database.to_string(),
            name: name.to_string(),
            engine: engine.to_string(),
            ..Self::default()
        }
    }

    pub fn engine_full(mut self, engine_full: &str) -> Self {
        self.engine_full = engine_full.to_string();
        self
    }

    pub fn create_query(mut self, create_query: &str) -> Self {
        self.create_query = create_query.to_string();
        self
    }

    pub fn rows(mut self, rows: u64) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn bytes(mut self, bytes: u64) -> Self {
        self.bytes = Some(bytes);
        self
    }

    pub fn dependency(mut self, database: &str, table: &str) -> Self {
        self.dependencies
            .push((database.to_string(), table.to_string()));
        self
    }

    pub fn into_row(self) -> Row {
        let (databases, tables) = self.dependencies.into_iter().unzip();
        Row::new(vec![
            Field::Text(self.database),
            Field::Text(self.name),
            Field::Text(self.engine),
            Field::Text(self.engine_full),
            Field::Text(self.create_query),
            Field::from(self.rows),
            Field::from(self.bytes),
            Field::Array(databases),
            Field::Array(tables),
        ])
    }
}

/// Answers `system.tables` with scripted rows and `system.columns` with
/// scripted columns. Can be told to fail or to stall.
#[derive(Default)]
pub struct FakeSource {
    tables: Mutex<Vec<Row>>,
    columns: Mutex<Vec<Row>>,
    failure: Mutex<Option<SourceError>>,
    delay: Mutex<Option<Duration>>,
    table_queries: AtomicUsize,
    statements: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(rows: Vec<TableRow>) -> Self {
        let source = Self::new();
        source.set_tables(rows);
        source
    }

    pub fn set_tables(&self, rows: Vec<TableRow>) {
        *lock(&self.tables) = rows.into_iter().map(TableRow::into_row).collect();
    }

    pub fn set_raw_tables(&self, rows: Vec<Row>) {
        *lock(&self.tables) = rows;
    }

    /// Columns as `(name, type, position, comment)`.
    pub fn set_columns(&self, columns: &[(&str, &str, u64, &str)]) {
        *lock(&self.columns) = columns
            .iter()
            .map(|(name, data_type, position, comment)| {
                Row::new(vec![
                    Field::from(*name),
                    Field::from(*data_type),
                    Field::UInt(*position),
                    Field::from(*comment),
                ])
            })
            .collect();
    }

    pub fn fail_with(&self, error: SourceError) {
        *lock(&self.failure) = Some(error);
    }

    pub fn recover(&self) {
        *lock(&self.failure) = None;
    }

    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    /// Number of bulk `system.tables` queries received.
    pub fn table_queries(&self) -> usize {
        self.table_queries.load(Ordering::SeqCst)
    }

    /// Statements received, with arguments already bound.
    pub fn statements(&self) -> Vec<String> {
        lock(&self.statements).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl MetadataSource for FakeSource {
    async fn query(&self, statement: &str, args: &[&str]) -> Result<Vec<Row>, SourceError> {
        let bound = crate::sql::bind_args(statement, args)?;
        lock(&self.statements).push(bound);

        let is_tables = statement.contains("system.tables");
        if is_tables {
            self.table_queries.fetch_add(1, Ordering::SeqCst);
        }

        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = lock(&self.failure).clone() {
            return Err(error);
        }

        if is_tables {
            Ok(lock(&self.tables).clone())
        } else if statement.contains("system.columns") {
            Ok(lock(&self.columns).clone())
        } else {
            Ok(vec![Row::new(vec![Field::UInt(1)])])
        }
    }

    async fn ping(&self) -> Result<(), SourceError> {
        match lock(&self.failure).clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn close(&self) -> Result<(), SourceError> {
        Ok(())
    }
}
