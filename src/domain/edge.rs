use super::engine::EngineIcon;

/// Directed dependency: `target` depends on, or is derived from, `source`.
///
/// Endpoints are kept as the qualified text the extractor produced, so names
/// parsed out of definitions that do not match any cached table still render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// Icon of the table whose definition produced this edge.
    pub icon: EngineIcon,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, icon: EngineIcon) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            icon,
        }
    }
}
