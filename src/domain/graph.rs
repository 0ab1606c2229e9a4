//! Diagram models produced by graph traversal and consumed by renderers.
//!
//! Nodes are anchored by a stable 32-bit id derived from the qualified name,
//! so the same table keeps its anchor across requests and generations.

use sha2::{Digest, Sha256};

use super::engine::EngineIcon;

/// Stable diagram anchor for a qualified table name: the first four bytes of
/// its SHA-256 digest. Collisions are possible and accepted.
pub fn node_id(qualified_name: &str) -> u32 {
    let digest = Sha256::digest(qualified_name.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Depends,
    Materialized,
    Distributed,
    Dictionary,
}

impl EdgeKind {
    /// Edge style follows the icon of the table whose definition produced it.
    pub fn from_icon(icon: EngineIcon) -> Self {
        match icon {
            EngineIcon::MaterializedView => Self::Materialized,
            EngineIcon::Distributed => Self::Distributed,
            EngineIcon::Dictionary => Self::Dictionary,
            _ => Self::Depends,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Depends => "depends",
            Self::Materialized => "materialized",
            Self::Distributed => "distributed",
            Self::Dictionary => "dictionary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    pub id: u32,
    pub name: String,
    /// Display text, possibly carrying markup for row and size figures.
    pub label: String,
    pub engine: Option<String>,
}

impl DiagramNode {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: node_id(&name),
            name,
            label: label.into(),
            engine: None,
        }
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramEdge {
    pub source: DiagramNode,
    pub target: DiagramNode,
    pub kind: EdgeKind,
}

impl DiagramEdge {
    pub fn key(&self) -> (u32, u32) {
        (self.source.id, self.target.id)
    }
}

/// Neighborhood of one table: every edge reachable forward and backward from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDiagram {
    pub root: DiagramNode,
    /// Emission order; each (source, target) pair appears once.
    pub edges: Vec<DiagramEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub engine: String,
    pub count: usize,
}

/// All tables of one database that pass the engine filter, with edges among them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseDiagram {
    pub database: String,
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
    pub legend: Vec<LegendEntry>,
}
