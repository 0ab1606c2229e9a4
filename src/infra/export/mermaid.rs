use std::fmt::Write as _;

use crate::app::ports::DiagramRenderer;
use crate::domain::{DatabaseDiagram, DiagramEdge, DiagramNode, EdgeKind, TableDiagram};

const ROOT_STYLE: &str = "fill:#FF6D00,stroke:#AA00FF,color:#FFFFFF";
const FIRST_LEGEND_ID: u32 = 999_999;
const FALLBACK_ICON: &str = "fa-solid fa-table";

/// Engine name, node colour, legend icon.
const ENGINE_PALETTE: [(&str, &str, &str); 22] = [
    ("MergeTree", "#1f77b4", "fa-solid fa-database"),
    ("ReplicatedMergeTree", "#ff7f0e", "fa-solid fa-copy"),
    ("SummingMergeTree", "#2ca02c", "fa-solid fa-calculator"),
    ("ReplicatedSummingMergeTree", "#2ca02c", "fa-solid fa-calculator"),
    ("ReplacingMergeTree", "#d62728", "fa-solid fa-sync-alt"),
    ("ReplicatedReplacingMergeTree", "#d62728", "fa-solid fa-sync-alt"),
    ("AggregatingMergeTree", "#9467bd", "fa-solid fa-chart-bar"),
    ("ReplicatedAggregatingMergeTree", "#9467bd", "fa-solid fa-chart-bar"),
    ("CollapsingMergeTree", "#8c564b", "fa-solid fa-compress"),
    ("ReplicatedCollapsingMergeTree", "#8c564b", "fa-solid fa-compress"),
    ("VersionedCollapsingMergeTree", "#e377c2", "fa-solid fa-code-branch"),
    ("ReplicatedVersionedCollapsingMergeTree", "#e377c2", "fa-solid fa-code-branch"),
    ("GraphiteMergeTree", "#7f7f7f", "fa-solid fa-chart-line"),
    ("ReplicatedGraphiteMergeTree", "#7f7f7f", "fa-solid fa-chart-line"),
    ("MaterializedView", "#bcbd22", "fa-solid fa-eye"),
    ("View", "#17becf", "fa-solid fa-search"),
    ("Dictionary", "#ffbb78", "fa-solid fa-book"),
    ("Distributed", "#ff9896", "fa-solid fa-share-alt"),
    ("Memory", "#c5b0d5", "fa-solid fa-memory"),
    ("Log", "#c7c7c7", "fa-solid fa-file-text"),
    ("TinyLog", "#dbdb8d", "fa-solid fa-file"),
    ("StripeLog", "#9edae5", "fa-solid fa-stream"),
];

/// Renders diagrams as Mermaid flowcharts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidRenderer;

impl MermaidRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Mermaid labels are double-quoted; embedded quotes use its entity code.
    fn escape_label(label: &str) -> String {
        label.replace('"', "#quot;")
    }

    fn arrow(kind: EdgeKind) -> &'static str {
        match kind {
            EdgeKind::Materialized => "-.->|materialized|",
            EdgeKind::Distributed => "==>|distributed|",
            EdgeKind::Dictionary => "-.->|dictionary|",
            EdgeKind::Depends => "-->|depends|",
        }
    }

    fn palette(engine: &str) -> Option<(&'static str, &'static str)> {
        ENGINE_PALETTE
            .iter()
            .find(|(name, _, _)| *name == engine)
            .map(|(_, color, icon)| (*color, *icon))
    }

    fn node(node: &DiagramNode) -> String {
        format!("{}[\"{}\"]", node.id, Self::escape_label(&node.label))
    }

    fn write_labelled_edge(out: &mut String, edge: &DiagramEdge) {
        let _ = writeln!(
            out,
            "    {} {} {}",
            Self::node(&edge.source),
            Self::arrow(edge.kind),
            Self::node(&edge.target)
        );
    }
}

impl DiagramRenderer for MermaidRenderer {
    fn render_table(&self, diagram: &TableDiagram) -> String {
        let mut out = String::from("flowchart TB\n");
        let _ = writeln!(out, "    {}\n", Self::node(&diagram.root));
        let _ = writeln!(out, "    style {} {ROOT_STYLE}\n", diagram.root.id);
        for edge in &diagram.edges {
            Self::write_labelled_edge(&mut out, edge);
        }
        out
    }

    fn render_database(&self, diagram: &DatabaseDiagram) -> String {
        let mut out = String::from("flowchart LR\n");
        let _ = writeln!(out, "    %% Database: {}\n", diagram.database);

        for node in &diagram.nodes {
            let _ = writeln!(out, "    {}", Self::node(node));
            if let Some((color, _)) = node.engine.as_deref().and_then(Self::palette) {
                let _ = writeln!(
                    out,
                    "    style {} fill:{color},stroke:#333,stroke-width:2px,color:#fff",
                    node.id
                );
            }
        }

        out.push_str("\n    %% Relationships\n");
        for edge in &diagram.edges {
            let _ = writeln!(
                out,
                "    {} {} {}",
                edge.source.id,
                Self::arrow(edge.kind),
                edge.target.id
            );
        }

        if !diagram.legend.is_empty() {
            out.push_str("\n    %% Legend\n");
            for (legend_id, entry) in (FIRST_LEGEND_ID..).zip(&diagram.legend) {
                let palette = Self::palette(&entry.engine);
                let icon = palette.map_or(FALLBACK_ICON, |(_, icon)| icon);
                let label = format!("<i class=\"{icon}\"></i> {} ({})", entry.engine, entry.count);
                let _ = writeln!(out, "    {legend_id}[\"{}\"]", Self::escape_label(&label));
                if let Some((color, _)) = palette {
                    let _ = writeln!(
                        out,
                        "    style {legend_id} fill:{color},stroke:#333,stroke-width:1px,color:#fff"
                    );
                }
            }
        }

        out
    }
}
