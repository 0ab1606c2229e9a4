use std::sync::Arc;

use schemaflow::app::test_support::{FakeSource, TableRow};

pub const EVENTS_DDL: &str =
    "CREATE TABLE analytics.events (`id` UInt64, `ts` DateTime) ENGINE = MergeTree ORDER BY id";

pub const EVENTS_MV_DDL: &str = "CREATE MATERIALIZED VIEW analytics.events_mv TO analytics.daily \
     (`day` Date, `hits` UInt64) AS SELECT toDate(ts) AS day, count() AS hits \
     FROM analytics.events GROUP BY day";

/// A small warehouse: a view feeding a rollup behind a distributed table, a
/// dictionary over a lookup table, one replicated table, and system noise.
pub fn sample_tables() -> Vec<TableRow> {
    vec![
        TableRow::new("analytics", "countries", "MergeTree"),
        TableRow::new("analytics", "daily", "SummingMergeTree")
            .rows(30)
            .bytes(512),
        TableRow::new("analytics", "daily_all", "Distributed")
            .engine_full("Distributed('cluster', 'analytics', 'daily', rand())"),
        TableRow::new("analytics", "events", "MergeTree")
            .rows(1500)
            .bytes(2048)
            .create_query(EVENTS_DDL),
        TableRow::new("analytics", "events_mv", "MaterializedView").create_query(EVENTS_MV_DDL),
        TableRow::new("analytics", "geo_dict", "Dictionary").dependency("analytics", "countries"),
        TableRow::new("billing", "invoices", "ReplicatedMergeTree").rows(5),
        TableRow::new("system", "parts", "SystemParts"),
    ]
}

pub fn sample_source() -> Arc<FakeSource> {
    let source = FakeSource::with_tables(sample_tables());
    source.set_columns(&[
        ("id", "UInt64", 1, "event id"),
        ("ts", "DateTime", 2, ""),
    ]);
    Arc::new(source)
}
