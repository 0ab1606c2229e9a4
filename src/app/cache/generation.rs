use std::collections::{BTreeMap, HashMap};

use tokio::time::{Duration, Instant};

use super::config::CacheConfig;
use crate::domain::{Edge, QualifiedName, TableSnapshot};
use crate::error::CacheError;
use crate::extract::extract;

/// Database name to (table name to sidebar label).
pub type DatabaseIndex = BTreeMap<String, BTreeMap<String, String>>;

/// One immutable snapshot of the whole catalog. The table map, edge list and
/// database index are always derived from the same set of rows.
#[derive(Debug)]
pub struct CacheGeneration {
    id: u64,
    tables: HashMap<QualifiedName, TableSnapshot>,
    edges: Vec<Edge>,
    databases: DatabaseIndex,
    refreshed_at: Instant,
}

impl CacheGeneration {
    /// Drops denylisted tables and edge endpoints, runs extraction over the rest.
    /// Edge order follows input order.
    pub fn build(id: u64, tables: Vec<TableSnapshot>, config: &CacheConfig) -> Self {
        let mut by_name = HashMap::with_capacity(tables.len());
        let mut edges = Vec::new();
        let mut databases = DatabaseIndex::new();

        for mut table in tables {
            if config.is_denied(&table.name.database) {
                continue;
            }

            let extraction = extract(&table);
            table.icon = extraction.icon;
            edges.extend(extraction.edges.into_iter().filter(|edge| {
                !config.denies_endpoint(&edge.source) && !config.denies_endpoint(&edge.target)
            }));

            databases
                .entry(table.name.database.clone())
                .or_default()
                .insert(table.name.table.clone(), table.list_label());
            by_name.insert(table.name.clone(), table);
        }

        Self {
            id,
            tables: by_name,
            edges,
            databases,
            refreshed_at: Instant::now(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn refreshed_at(&self) -> Instant {
        self.refreshed_at
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.refreshed_at.elapsed() > ttl
    }

    pub fn get(&self, database: &str, table: &str) -> Result<&TableSnapshot, CacheError> {
        self.tables
            .get(&QualifiedName::new(database, table))
            .ok_or_else(|| CacheError::table_not_found(database, table))
    }

    /// Looks up an edge endpoint such as `db.table`.
    pub fn lookup(&self, qualified_name: &str) -> Option<&TableSnapshot> {
        self.tables.get(&QualifiedName::parse(qualified_name))
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSnapshot> {
        self.tables.values()
    }

    pub fn tables_in<'a>(&'a self, database: &'a str) -> impl Iterator<Item = &'a TableSnapshot> {
        self.tables
            .values()
            .filter(move |table| table.name.database == database)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn databases(&self) -> &DatabaseIndex {
        &self.databases
    }

    pub fn has_database(&self, database: &str) -> bool {
        self.databases.contains_key(database)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}
