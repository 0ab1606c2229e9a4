//! Relationship inference from table definitions.
//!
//! Best-effort textual parsing: a definition that does not have the expected
//! shape yields no edge for that rule. Nothing here returns an error.

use crate::domain::{Edge, EngineIcon, TableSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub edges: Vec<Edge>,
    pub icon: EngineIcon,
}

/// Infer the edges one table's definition implies, first matching engine rule wins.
pub fn extract(table: &TableSnapshot) -> Extraction {
    let icon = EngineIcon::for_engine(&table.engine);
    let this = table.qualified_name();

    let edges = match icon {
        EngineIcon::MergeTree | EngineIcon::Replicated | EngineIcon::Generic => Vec::new(),
        EngineIcon::Dictionary => table
            .dependencies
            .first()
            .map(|dependency| vec![Edge::new(dependency.to_string(), this, icon)])
            .unwrap_or_default(),
        EngineIcon::Distributed => distributed_target(&table.engine_full)
            .map(|target| vec![Edge::new(this, target, icon)])
            .unwrap_or_default(),
        EngineIcon::MaterializedView => view_edges(&table.create_query, icon),
    };

    Extraction { edges, icon }
}

/// `Distributed('cluster','db','table',...)`: database and table are the
/// 4th and 6th single-quote-delimited tokens.
fn distributed_target(engine_full: &str) -> Option<String> {
    let parts: Vec<&str> = engine_full.split('\'').collect();
    if parts.len() < 6 {
        return None;
    }
    Some(format!("{}.{}", parts[3], parts[5]))
}

/// `CREATE MATERIALIZED VIEW <view> TO <dest> ... FROM <source> ...`
fn view_edges(create_query: &str, icon: EngineIcon) -> Vec<Edge> {
    let tokens: Vec<&str> = create_query.split_whitespace().collect();
    if tokens.len() <= 5 {
        return Vec::new();
    }
    let Some((_, after_from)) = create_query.split_once("FROM ") else {
        return Vec::new();
    };

    let view = clean_table_ref(tokens[3]);
    let destination = clean_table_ref(tokens[5]);
    let source = after_from
        .split_whitespace()
        .next()
        .map(clean_table_ref)
        .unwrap_or_default();

    let mut edges = Vec::with_capacity(2);
    if !source.is_empty() {
        edges.push(Edge::new(source, view.clone(), icon));
    }
    edges.push(Edge::new(view, destination, icon));
    edges
}

/// Drops identifier quoting so `` `db`.`t` `` matches `db.t`.
fn clean_table_ref(token: &str) -> String {
    token
        .chars()
        .filter(|c| !matches!(c, '`' | '"'))
        .collect::<String>()
        .trim_end_matches(';')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QualifiedName;
    use rstest::rstest;

    fn table(name: &str, engine: &str) -> TableSnapshot {
        TableSnapshot::new(QualifiedName::parse(name), engine)
    }

    fn pairs(extraction: &Extraction) -> Vec<(&str, &str)> {
        extraction
            .edges
            .iter()
            .map(|edge| (edge.source.as_str(), edge.target.as_str()))
            .collect()
    }

    mod policy {
        use super::*;

        #[rstest]
        #[case("MergeTree", EngineIcon::MergeTree)]
        #[case("ReplicatedMergeTree", EngineIcon::Replicated)]
        #[case("ReplicatedSummingMergeTree", EngineIcon::Replicated)]
        #[case("SummingMergeTree", EngineIcon::Generic)]
        #[case("Log", EngineIcon::Generic)]
        #[case("View", EngineIcon::Generic)]
        fn terminal_engines_produce_no_edges(#[case] engine: &str, #[case] icon: EngineIcon) {
            let input = table("db.t", engine)
                .with_engine_full("Distributed('c','x','y')")
                .with_create_query("CREATE MATERIALIZED VIEW db.mv TO db.dest AS SELECT * FROM db.src")
                .with_dependencies(vec![QualifiedName::new("db", "dep")]);

            let extraction = extract(&input);

            assert!(extraction.edges.is_empty());
            assert_eq!(extraction.icon, icon);
        }

        #[test]
        fn extraction_is_deterministic() {
            let input = table("db.mv", "MaterializedView")
                .with_create_query("CREATE MATERIALIZED VIEW db.mv TO db.dest AS SELECT * FROM db.src");

            assert_eq!(extract(&input), extract(&input));
        }
    }

    mod dictionary {
        use super::*;

        #[test]
        fn declared_dependency_points_at_dictionary() {
            let input = table("db.dict", "Dictionary")
                .with_dependencies(vec![QualifiedName::new("src_db", "lookup")]);

            let extraction = extract(&input);

            assert_eq!(pairs(&extraction), vec![("src_db.lookup", "db.dict")]);
            assert_eq!(extraction.icon, EngineIcon::Dictionary);
        }

        #[test]
        fn without_dependencies_produces_no_edge() {
            let extraction = extract(&table("db.dict", "Dictionary"));

            assert!(extraction.edges.is_empty());
            assert_eq!(extraction.icon, EngineIcon::Dictionary);
        }

        #[test]
        fn only_first_dependency_is_used() {
            let input = table("db.dict", "Dictionary").with_dependencies(vec![
                QualifiedName::new("a", "one"),
                QualifiedName::new("b", "two"),
            ]);

            assert_eq!(pairs(&extract(&input)), vec![("a.one", "db.dict")]);
        }
    }

    mod distributed {
        use super::*;

        #[test]
        fn resolves_remote_table_from_engine_parameters() {
            let input = table("analytics.proxy", "Distributed")
                .with_engine_full("Distributed('cluster','target_db','target_table',rand())");

            let extraction = extract(&input);

            assert_eq!(
                pairs(&extraction),
                vec![("analytics.proxy", "target_db.target_table")]
            );
            assert_eq!(extraction.icon, EngineIcon::Distributed);
        }

        #[rstest]
        #[case("")]
        #[case("Distributed(cluster, db, table)")]
        #[case("Distributed('cluster','db')")]
        fn too_few_quoted_tokens_produce_no_edge(#[case] engine_full: &str) {
            let input = table("analytics.proxy", "Distributed").with_engine_full(engine_full);

            let extraction = extract(&input);

            assert!(extraction.edges.is_empty());
            assert_eq!(extraction.icon, EngineIcon::Distributed);
        }
    }

    mod materialized_view {
        use super::*;

        #[test]
        fn links_source_view_and_destination() {
            let input = table("db.mv", "MaterializedView")
                .with_create_query("CREATE MATERIALIZED VIEW db.mv TO db.dest AS SELECT * FROM db.src");

            let extraction = extract(&input);

            assert_eq!(
                pairs(&extraction),
                vec![("db.src", "db.mv"), ("db.mv", "db.dest")]
            );
            assert_eq!(extraction.icon, EngineIcon::MaterializedView);
        }

        #[test]
        fn column_list_and_where_clause_do_not_disturb_positions() {
            let input = table("db.mv", "MaterializedView").with_create_query(
                "CREATE MATERIALIZED VIEW db.mv TO db.dest (`id` UInt64, `n` UInt32) AS SELECT id, count() AS n FROM db.src WHERE id > 0 GROUP BY id",
            );

            assert_eq!(
                pairs(&extract(&input)),
                vec![("db.src", "db.mv"), ("db.mv", "db.dest")]
            );
        }

        #[test]
        fn backtick_quoting_is_dropped() {
            let input = table("db.mv", "MaterializedView").with_create_query(
                "CREATE MATERIALIZED VIEW `db`.`mv` TO `db`.`dest` AS SELECT * FROM `db`.`src`",
            );

            assert_eq!(
                pairs(&extract(&input)),
                vec![("db.src", "db.mv"), ("db.mv", "db.dest")]
            );
        }

        #[rstest]
        #[case("")]
        #[case("CREATE MATERIALIZED VIEW db.mv")]
        #[case("CREATE MATERIALIZED VIEW db.mv TO db.dest")]
        #[case("CREATE MATERIALIZED VIEW db.mv TO db.dest AS SELECT 1")]
        fn short_or_sourceless_statements_produce_no_edges(#[case] create_query: &str) {
            let input = table("db.mv", "MaterializedView").with_create_query(create_query);

            let extraction = extract(&input);

            assert!(extraction.edges.is_empty());
            assert_eq!(extraction.icon, EngineIcon::MaterializedView);
        }

        #[test]
        fn trailing_from_keeps_destination_edge() {
            let input = table("db.mv", "MaterializedView")
                .with_create_query("CREATE MATERIALIZED VIEW db.mv TO db.dest AS SELECT * FROM ");

            assert_eq!(pairs(&extract(&input)), vec![("db.mv", "db.dest")]);
        }
    }
}
