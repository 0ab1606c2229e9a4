use serde::Serialize;

use super::column::Column;
use super::format::format_bytes;
use super::table::{QualifiedName, TableSnapshot};

/// Table details served per request: cached table facts plus live columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDetails {
    pub name: String,
    pub database: String,
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,
    pub columns: Vec<Column>,
    pub create_query: String,
}

impl TableDetails {
    pub fn new(table: &TableSnapshot, columns: Vec<Column>, create_query: String) -> Self {
        Self {
            name: table.name.table.clone(),
            database: table.name.database.clone(),
            engine: table.engine.clone(),
            total_rows: table.total_rows,
            total_bytes: table.total_bytes,
            columns,
            create_query,
        }
    }
}

/// Catalog entry for the plain JSON database listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub engine: String,
    pub rows: Option<u64>,
    /// Formatted byte size, empty when unknown.
    pub size: String,
}

impl From<&TableSnapshot> for TableSummary {
    fn from(table: &TableSnapshot) -> Self {
        Self {
            name: table.name.table.clone(),
            engine: table.engine.clone(),
            rows: table.total_rows,
            size: table
                .total_bytes
                .map(|bytes| format_bytes(Some(bytes)))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub source_database: String,
    pub source_table: String,
    pub target_database: String,
    pub target_table: String,
    pub relationship_type: String,
}

impl Relationship {
    pub fn new(source: &str, target: &str, relationship_type: impl Into<String>) -> Self {
        let source = QualifiedName::parse(source);
        let target = QualifiedName::parse(target);
        Self {
            source_database: source.database,
            source_table: source.table,
            target_database: target.database,
            target_table: target.table,
            relationship_type: relationship_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_leaves_size_empty_when_bytes_unknown() {
        let table = TableSnapshot::new(QualifiedName::new("d", "proxy"), "Distributed");

        let summary = TableSummary::from(&table);

        assert_eq!(summary.engine, "Distributed");
        assert_eq!(summary.rows, None);
        assert_eq!(summary.size, "");
    }

    #[test]
    fn summary_formats_known_size() {
        let table = TableSnapshot::new(QualifiedName::new("d", "t"), "MergeTree")
            .with_rows(Some(5))
            .with_bytes(Some(1024));

        let summary = TableSummary::from(&table);

        assert_eq!(summary.size, "1.0 KB");
        assert_eq!(summary.rows, Some(5));
    }

    #[test]
    fn details_omit_absent_counters() {
        let table = TableSnapshot::new(QualifiedName::new("d", "proxy"), "Distributed");
        let details = TableDetails::new(&table, vec![Column::new("id", "UInt64", 1)], String::new());

        let json = serde_json::to_value(&details).unwrap();

        assert_eq!(json["name"], "proxy");
        assert_eq!(json["database"], "d");
        assert!(json.get("total_rows").is_none());
        assert_eq!(json["columns"][0]["type"], "UInt64");
    }

    #[test]
    fn relationship_splits_endpoints() {
        let rel = Relationship::new("db.src", "db.mv", "materialized");

        assert_eq!(rel.source_database, "db");
        assert_eq!(rel.source_table, "src");
        assert_eq!(rel.target_table, "mv");
    }
}
