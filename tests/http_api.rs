mod harness;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use harness::fixtures::{sample_source, sample_tables};
use harness::{create_test_app, create_test_app_with, get};

use schemaflow::app::cache::CacheConfig;
use schemaflow::app::ports::SourceError;
use schemaflow::app::test_support::TableRow;
use schemaflow::domain::node_id;

mod render {
    use super::*;

    #[tokio::test]
    async fn sidebar_lists_visible_databases_with_labels() {
        let app = create_test_app(&sample_source());

        let (status, body) = get(&app, "/api/render/databases").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("system").is_none());
        assert_eq!(
            body["analytics"]["events_mv"],
            "<i class=\"fa-solid fa-eye\"></i> events_mv"
        );
        let invoices = body["billing"]["invoices"].as_str().unwrap();
        assert!(invoices.starts_with("<i class=\"fa-solid fa-circle-nodes\"></i> invoices<br>"));
        assert!(invoices.contains("Rows: <b>5</b> | Size: <b>N/A</b>"));
    }

    #[tokio::test]
    async fn table_schema_is_mermaid_neighborhood() {
        let app = create_test_app(&sample_source());

        let (status, body) = get(&app, "/api/render/schema/analytics/daily").await;

        assert_eq!(status, StatusCode::OK);
        let schema = body["schema"].as_str().unwrap();
        let root = node_id("analytics.daily");
        assert!(schema.starts_with("flowchart TB\n"));
        assert!(schema.contains(&format!(
            "    {root}[\"analytics.daily<br><small>Rows: <b>30</b> Size: <b>512 B</b></small>\"]\n"
        )));
        assert!(schema.contains(&format!(
            "    style {root} fill:#FF6D00,stroke:#AA00FF,color:#FFFFFF"
        )));
        assert!(schema.contains(&format!(
            "{}[\"analytics.events_mv\"] -.->|materialized| {root}",
            node_id("analytics.events_mv")
        )));
        assert!(schema.contains(&format!(
            "{}[\"analytics.daily_all\"] ==>|distributed| {root}",
            node_id("analytics.daily_all")
        )));
        assert_eq!(schema.matches("-.->|materialized|").count(), 2);
    }

    #[tokio::test]
    async fn database_schema_styles_nodes_and_lists_legend() {
        let app = create_test_app(&sample_source());

        let (status, body) = get(&app, "/api/render/database/analytics/schema").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filters"], json!({ "engines": [], "metadata": true }));
        let schema = body["schema"].as_str().unwrap();
        assert!(schema.starts_with("flowchart LR\n    %% Database: analytics\n"));
        assert!(schema.contains(
            "[\"daily (SummingMergeTree)<br><small>Rows: <b>30</b> Size: <b>512 B</b></small>\"]"
        ));
        assert!(schema.contains(&format!(
            "    style {} fill:#1f77b4,stroke:#333,stroke-width:2px,color:#fff",
            node_id("analytics.events")
        )));
        assert!(schema.contains(&format!(
            "    {} -.->|dictionary| {}",
            node_id("analytics.countries"),
            node_id("analytics.geo_dict")
        )));
        assert!(schema.contains(
            "    999999[\"<i class=#quot;fa-solid fa-book#quot;></i> Dictionary (1)\"]"
        ));
        assert!(schema.contains("MergeTree (2)"));
    }

    #[tokio::test]
    async fn database_schema_filter_drops_edges_leaving_the_selection() {
        let app = create_test_app(&sample_source());

        let (status, body) = get(
            &app,
            "/api/render/database/analytics/schema?engines=MergeTree&engines=Dictionary&metadata=false",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["filters"],
            json!({ "engines": ["MergeTree", "Dictionary"], "metadata": false })
        );
        let schema = body["schema"].as_str().unwrap();
        assert!(schema.contains("[\"events (MergeTree)\"]"));
        assert!(!schema.contains("materialized"));
        assert!(schema.contains("-.->|dictionary|"));
        assert!(!schema.contains("<small>"));
    }

    #[tokio::test]
    async fn unknown_database_schema_is_404() {
        let app = create_test_app(&sample_source());

        let (status, body) = get(&app, "/api/render/database/nowhere/schema").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "database 'nowhere' not found");
    }

    #[tokio::test]
    async fn stats_aggregate_per_engine() {
        let app = create_test_app(&sample_source());

        let (status, body) = get(&app, "/api/render/database/analytics/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_tables"], 6);
        assert_eq!(body["total_rows"], 1530);
        assert_eq!(body["total_bytes"], 2560);
        assert_eq!(
            body["engine_counts"]["MergeTree"],
            json!({ "count": 2, "total_rows": 1500, "total_bytes": 2048 })
        );
        assert_eq!(
            body["engine_counts"]["Distributed"],
            json!({ "count": 1, "total_rows": 0, "total_bytes": 0 })
        );
    }

    #[tokio::test]
    async fn stats_for_unknown_database_are_empty() {
        let app = create_test_app(&sample_source());

        let (status, body) = get(&app, "/api/render/database/nowhere/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_tables"], 0);
        assert_eq!(body["engine_counts"], json!({}));
    }
}

mod tables {
    use super::*;

    #[tokio::test]
    async fn details_combine_cache_and_live_columns() {
        let source = sample_source();
        let app = create_test_app(&source);

        let (status, body) = get(&app, "/api/table/analytics/events").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "events");
        assert_eq!(body["database"], "analytics");
        assert_eq!(body["engine"], "MergeTree");
        assert_eq!(body["total_rows"], 1500);
        assert_eq!(body["total_bytes"], 2048);
        assert_eq!(
            body["columns"][0],
            json!({ "name": "id", "type": "UInt64", "position": 1, "comment": "event id" })
        );
        assert_eq!(
            body["create_query"],
            "CREATE TABLE analytics.events (`id` UInt64,\n    `ts` DateTime\n) ENGINE = MergeTree\nORDER BY id"
        );
        assert!(
            source
                .statements()
                .iter()
                .any(|sql| sql.contains("WHERE database = 'analytics' AND table = 'events'"))
        );
    }

    #[tokio::test]
    async fn details_omit_unknown_figures() {
        let app = create_test_app(&sample_source());

        let (_, body) = get(&app, "/api/table/analytics/countries").await;

        assert!(body.get("total_rows").is_none());
        assert!(body.get("total_bytes").is_none());
    }

    #[tokio::test]
    async fn relationships_follow_the_neighborhood() {
        let app = create_test_app(&sample_source());

        let (status, body) = get(&app, "/api/table/analytics/events/relationships").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {
                    "source_database": "analytics",
                    "source_table": "events",
                    "target_database": "analytics",
                    "target_table": "events_mv",
                    "relationship_type": "materialized"
                },
                {
                    "source_database": "analytics",
                    "source_table": "events_mv",
                    "target_database": "analytics",
                    "target_table": "daily",
                    "relationship_type": "materialized"
                }
            ])
        );
    }

    #[tokio::test]
    async fn catalog_groups_tables_by_database() {
        let app = create_test_app(&sample_source());

        let (status, body) = get(&app, "/api/databases").await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body["analytics"]
            .as_array()
            .unwrap()
            .iter()
            .map(|table| table["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["countries", "daily", "daily_all", "events", "events_mv", "geo_dict"]
        );
        assert_eq!(body["analytics"][3]["type"], "MergeTree");
        assert_eq!(body["analytics"][3]["size"], "2.0 KB");
    }

    #[tokio::test]
    async fn denylisted_table_is_not_found() {
        let app = create_test_app(&sample_source());

        let (status, _) = get(&app, "/api/table/system/parts").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod freshness {
    use super::*;

    fn config() -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(60),
            ..CacheConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn requests_within_ttl_share_one_bulk_query() {
        let source = sample_source();
        let app = create_test_app_with(&source, config());

        get(&app, "/api/render/databases").await;
        get(&app, "/api/render/schema/analytics/events").await;
        get(&app, "/api/render/database/analytics/stats").await;

        assert_eq!(source.table_queries(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_cache_picks_up_new_tables() {
        let source = sample_source();
        let app = create_test_app_with(&source, config());
        get(&app, "/api/render/databases").await;

        let mut tables = sample_tables();
        tables.push(TableRow::new("analytics", "sessions", "MergeTree"));
        source.set_tables(tables);
        tokio::time::advance(Duration::from_secs(61)).await;

        let (_, body) = get(&app, "/api/render/databases").await;

        assert!(body["analytics"].get("sessions").is_some());
        assert_eq!(source.table_queries(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_serves_previous_generation() {
        let source = sample_source();
        let app = create_test_app_with(&source, config());
        let (_, before) = get(&app, "/api/render/databases").await;

        source.fail_with(SourceError::Connection("connection reset".to_string()));
        tokio::time::advance(Duration::from_secs(61)).await;

        let (status, after) = get(&app, "/api/render/databases").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(after, before);
        assert_eq!(source.table_queries(), 2);
    }

    #[tokio::test]
    async fn cold_failure_is_a_single_error_message() {
        let source = sample_source();
        source.fail_with(SourceError::Status {
            status: 516,
            body: "Authentication failed".to_string(),
        });
        let app = create_test_app(&source);

        let (status, body) = get(&app, "/api/render/schema/analytics/events").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "metadata source unavailable: source returned status 516: Authentication failed" })
        );
    }
}
