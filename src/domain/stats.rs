use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub count: u64,
    pub total_rows: u64,
    pub total_bytes: u64,
}

/// Per-database rollup. Absent row and byte counts contribute zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub database: String,
    pub total_tables: u64,
    pub total_rows: u64,
    pub total_bytes: u64,
    pub engine_counts: BTreeMap<String, EngineStats>,
}

impl DatabaseStats {
    pub fn empty(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, engine: &str, rows: Option<u64>, bytes: Option<u64>) {
        let rows = rows.unwrap_or(0);
        let bytes = bytes.unwrap_or(0);

        self.total_tables += 1;
        self.total_rows = self.total_rows.saturating_add(rows);
        self.total_bytes = self.total_bytes.saturating_add(bytes);

        let entry = self.engine_counts.entry(engine.to_string()).or_default();
        entry.count += 1;
        entry.total_rows = entry.total_rows.saturating_add(rows);
        entry.total_bytes = entry.total_bytes.saturating_add(bytes);
    }
}
