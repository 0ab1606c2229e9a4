use serde::Serialize;

/// Presentation category of a table, derived from its engine kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineIcon {
    MergeTree,
    Replicated,
    Dictionary,
    Distributed,
    MaterializedView,
    Generic,
}

impl EngineIcon {
    /// First match wins: exact `MergeTree`, `Replicated*`, `Dictionary*`,
    /// exact `Distributed`, exact `MaterializedView`, then everything else.
    pub fn for_engine(engine: &str) -> Self {
        if engine == "MergeTree" {
            Self::MergeTree
        } else if engine.starts_with("Replicated") {
            Self::Replicated
        } else if engine.starts_with("Dictionary") {
            Self::Dictionary
        } else if engine == "Distributed" {
            Self::Distributed
        } else if engine == "MaterializedView" {
            Self::MaterializedView
        } else {
            Self::Generic
        }
    }

    pub const fn css_class(self) -> &'static str {
        match self {
            Self::MergeTree => "fa-solid fa-database",
            Self::Replicated => "fa-solid fa-circle-nodes",
            Self::Dictionary => "fa-solid fa-book",
            Self::Distributed => "fa-solid fa-diagram-project",
            Self::MaterializedView => "fa-solid fa-eye",
            Self::Generic => "fa-solid fa-table",
        }
    }

    pub fn html(self) -> String {
        format!("<i class=\"{}\"></i>", self.css_class())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("MergeTree", EngineIcon::MergeTree)]
    #[case("ReplicatedMergeTree", EngineIcon::Replicated)]
    #[case("ReplicatedReplacingMergeTree", EngineIcon::Replicated)]
    #[case("Dictionary", EngineIcon::Dictionary)]
    #[case("Distributed", EngineIcon::Distributed)]
    #[case("MaterializedView", EngineIcon::MaterializedView)]
    #[case("ReplacingMergeTree", EngineIcon::Generic)]
    #[case("View", EngineIcon::Generic)]
    #[case("", EngineIcon::Generic)]
    fn for_engine_classifies_engine_kinds(#[case] engine: &str, #[case] expected: EngineIcon) {
        assert_eq!(EngineIcon::for_engine(engine), expected);
    }

    #[test]
    fn html_wraps_css_class() {
        assert_eq!(
            EngineIcon::MaterializedView.html(),
            "<i class=\"fa-solid fa-eye\"></i>"
        );
    }
}
