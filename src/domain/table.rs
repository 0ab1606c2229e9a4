use std::fmt;

use serde::Serialize;

use super::engine::EngineIcon;
use super::format::{format_bytes, format_rows};

/// `database.table` pair identifying one table in the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QualifiedName {
    pub database: String,
    pub table: String,
}

impl QualifiedName {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }

    /// Splits on the first dot. A name without one has an empty database part.
    pub fn parse(name: &str) -> Self {
        match name.split_once('.') {
            Some((database, table)) => Self::new(database, table),
            None => Self::new("", name),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.table)
    }
}

/// Captured state of one table within a cache generation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    pub name: QualifiedName,
    pub engine: String,
    /// Raw engine parameter string, e.g. `Distributed('cluster','db','t',rand())`.
    pub engine_full: String,
    pub create_query: String,
    pub total_rows: Option<u64>,
    pub total_bytes: Option<u64>,
    /// Declared load-time dependencies (dictionaries).
    pub dependencies: Vec<QualifiedName>,
    pub icon: EngineIcon,
}

impl TableSnapshot {
    pub fn new(name: QualifiedName, engine: impl Into<String>) -> Self {
        let engine = engine.into();
        let icon = EngineIcon::for_engine(&engine);
        Self {
            name,
            engine,
            engine_full: String::new(),
            create_query: String::new(),
            total_rows: None,
            total_bytes: None,
            dependencies: Vec::new(),
            icon,
        }
    }

    pub fn with_engine_full(mut self, engine_full: impl Into<String>) -> Self {
        self.engine_full = engine_full.into();
        self
    }

    pub fn with_create_query(mut self, create_query: impl Into<String>) -> Self {
        self.create_query = create_query.into();
        self
    }

    pub fn with_rows(mut self, rows: Option<u64>) -> Self {
        self.total_rows = rows;
        self
    }

    pub fn with_bytes(mut self, bytes: Option<u64>) -> Self {
        self.total_bytes = bytes;
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<QualifiedName>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn qualified_name(&self) -> String {
        self.name.to_string()
    }

    /// Sidebar entry: icon and table name, plus row and size figures when rows are tracked.
    pub fn list_label(&self) -> String {
        let icon = self.icon.html();
        if self.total_rows.is_none() {
            return format!("{} {}", icon, self.name.table);
        }
        format!(
            "{} {}<br><small style=\"color: #000; font-size: 0.8em;\">Rows: <b>{}</b> | Size: <b>{}</b></small>",
            icon,
            self.name.table,
            format_rows(self.total_rows),
            format_bytes(self.total_bytes)
        )
    }

    /// Row and size figures for diagram nodes, `None` when rows are not tracked.
    pub fn metadata_line(&self) -> Option<String> {
        self.total_rows?;
        Some(format!(
            "<small>Rows: <b>{}</b> Size: <b>{}</b></small>",
            format_rows(self.total_rows),
            format_bytes(self.total_bytes)
        ))
    }
}
