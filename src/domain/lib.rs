pub mod column;
pub mod edge;
pub mod engine;
pub mod format;
pub mod graph;
pub mod metadata;
pub mod stats;
pub mod table;

pub use column::Column;
pub use edge::Edge;
pub use engine::EngineIcon;
pub use format::{format_bytes, format_rows};
pub use graph::{
    DatabaseDiagram, DiagramEdge, DiagramNode, EdgeKind, LegendEntry, TableDiagram, node_id,
};
pub use metadata::{Relationship, TableDetails, TableSummary};
pub use stats::{DatabaseStats, EngineStats};
pub use table::{QualifiedName, TableSnapshot};
