use crate::domain::{DatabaseDiagram, TableDiagram};

/// Serializes traversal output into diagram markup.
#[cfg_attr(test, mockall::automock)]
pub trait DiagramRenderer: Send + Sync {
    fn render_table(&self, diagram: &TableDiagram) -> String;

    fn render_database(&self, diagram: &DatabaseDiagram) -> String;
}
