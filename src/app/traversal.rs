//! Walks the cached edge list to build single-table and whole-database diagrams.
//!
//! Walks recurse along edges forward (node is source) and backward (node is
//! target). Each direction keeps its own visited-edge set, which bounds the
//! recursion on cyclic data; a shared emitted set keeps every (source, target)
//! pair in the output once.

use std::collections::{BTreeMap, HashSet};

use crate::cache::CacheGeneration;
use crate::domain::{
    DatabaseDiagram, DiagramEdge, DiagramNode, Edge, EdgeKind, LegendEntry, Relationship,
    TableDiagram, TableSnapshot, node_id,
};
use crate::error::CacheError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSchemaOptions {
    /// Engine allow-list, matched case-insensitively. Empty allows every engine.
    pub engines: Vec<String>,
    pub include_metadata: bool,
}

impl Default for DatabaseSchemaOptions {
    fn default() -> Self {
        Self {
            engines: Vec::new(),
            include_metadata: true,
        }
    }
}

impl DatabaseSchemaOptions {
    pub fn allows(&self, engine: &str) -> bool {
        self.engines.is_empty()
            || self
                .engines
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(engine))
    }
}

/// Everything upstream and downstream of one table.
pub fn schema_for(
    generation: &CacheGeneration,
    database: &str,
    table: &str,
) -> Result<TableDiagram, CacheError> {
    let root = generation.get(database, table)?.qualified_name();

    let mut walk = Walk::new(generation, None, NodeLabels::Neighborhood);
    walk.forward(&root);
    walk.backward(&root);

    Ok(TableDiagram {
        root: walk.node(&root),
        edges: walk.edges,
    })
}

/// Every table of one database passing the engine filter, and the edges whose
/// endpoints are both among them.
pub fn schema_for_database(
    generation: &CacheGeneration,
    database: &str,
    options: &DatabaseSchemaOptions,
) -> Result<DatabaseDiagram, CacheError> {
    if !generation.has_database(database) {
        return Err(CacheError::database_not_found(database));
    }

    let mut tables: Vec<&TableSnapshot> = generation
        .tables_in(database)
        .filter(|table| options.allows(&table.engine))
        .collect();
    tables.sort_by(|a, b| a.name.cmp(&b.name));

    let names: Vec<String> = tables.iter().map(|table| table.qualified_name()).collect();
    let scope: HashSet<String> = names.iter().cloned().collect();

    let mut walk = Walk::new(
        generation,
        Some(&scope),
        NodeLabels::Database {
            include_metadata: options.include_metadata,
        },
    );
    let nodes = names.iter().map(|name| walk.node(name)).collect();
    for name in &names {
        walk.forward(name);
        walk.backward(name);
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for table in &tables {
        *counts.entry(table.engine.as_str()).or_default() += 1;
    }
    let legend = counts
        .into_iter()
        .map(|(engine, count)| LegendEntry {
            engine: engine.to_string(),
            count,
        })
        .collect();

    Ok(DatabaseDiagram {
        database: database.to_string(),
        nodes,
        edges: walk.edges,
        legend,
    })
}

/// The edges of `schema_for` as plain endpoint records.
pub fn relationships_for(
    generation: &CacheGeneration,
    database: &str,
    table: &str,
) -> Result<Vec<Relationship>, CacheError> {
    let diagram = schema_for(generation, database, table)?;
    Ok(diagram
        .edges
        .iter()
        .map(|edge| Relationship::new(&edge.source.name, &edge.target.name, edge.kind.as_str()))
        .collect())
}

#[derive(Debug, Clone, Copy)]
enum NodeLabels {
    /// Qualified name plus row and size figures when known.
    Neighborhood,
    /// `table (Engine)`, figures only on request.
    Database { include_metadata: bool },
}

fn edge_key(edge: &Edge) -> (u32, u32) {
    (node_id(&edge.source), node_id(&edge.target))
}

struct Walk<'a> {
    generation: &'a CacheGeneration,
    scope: Option<&'a HashSet<String>>,
    labels: NodeLabels,
    forward_seen: HashSet<(u32, u32)>,
    backward_seen: HashSet<(u32, u32)>,
    emitted: HashSet<(u32, u32)>,
    edges: Vec<DiagramEdge>,
}

impl<'a> Walk<'a> {
    fn new(
        generation: &'a CacheGeneration,
        scope: Option<&'a HashSet<String>>,
        labels: NodeLabels,
    ) -> Self {
        Self {
            generation,
            scope,
            labels,
            forward_seen: HashSet::new(),
            backward_seen: HashSet::new(),
            emitted: HashSet::new(),
            edges: Vec::new(),
        }
    }

    fn forward(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        let generation = self.generation;
        for edge in generation.edges() {
            if edge.source != name || !self.in_scope(edge) {
                continue;
            }
            if self.forward_seen.insert(edge_key(edge)) {
                self.emit(edge);
                self.forward(&edge.target);
            }
        }
    }

    fn backward(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        let generation = self.generation;
        for edge in generation.edges() {
            if edge.target != name || edge.source.is_empty() || !self.in_scope(edge) {
                continue;
            }
            if self.backward_seen.insert(edge_key(edge)) {
                self.emit(edge);
                self.backward(&edge.source);
            }
        }
    }

    fn in_scope(&self, edge: &Edge) -> bool {
        self.scope
            .is_none_or(|scope| scope.contains(&edge.source) && scope.contains(&edge.target))
    }

    fn emit(&mut self, edge: &Edge) {
        if !self.emitted.insert(edge_key(edge)) {
            return;
        }
        let diagram_edge = DiagramEdge {
            source: self.node(&edge.source),
            target: self.node(&edge.target),
            kind: EdgeKind::from_icon(edge.icon),
        };
        self.edges.push(diagram_edge);
    }

    fn node(&self, name: &str) -> DiagramNode {
        let table = self.generation.lookup(name);
        let metadata = table.and_then(TableSnapshot::metadata_line);

        let label = match self.labels {
            NodeLabels::Neighborhood => match metadata {
                Some(line) => format!("{name}<br>{line}"),
                None => name.to_string(),
            },
            NodeLabels::Database { include_metadata } => {
                let mut label = match table {
                    Some(table) => format!("{} ({})", table.name.table, table.engine),
                    None => format!("{name} (Unknown)"),
                };
                if include_metadata && let Some(line) = metadata {
                    label.push_str("<br>");
                    label.push_str(&line);
                }
                label
            }
        };

        let node = DiagramNode::new(name, label);
        match table {
            Some(table) => node.with_engine(table.engine.clone()),
            None => node,
        }
    }
}
