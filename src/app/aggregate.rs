use crate::cache::CacheGeneration;
use crate::domain::DatabaseStats;

/// Rolls up one database in a single pass. An unknown database yields an empty aggregate.
pub fn stats_for(generation: &CacheGeneration, database: &str) -> DatabaseStats {
    generation
        .tables_in(database)
        .fold(DatabaseStats::empty(database), |mut stats, table| {
            stats.record(&table.engine, table.total_rows, table.total_bytes);
            stats
        })
}
