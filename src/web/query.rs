//! Query-string handling for the database diagram route.

use serde::Serialize;

use crate::app::traversal::DatabaseSchemaOptions;

/// The filters echoed back alongside a database diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaFilters {
    pub engines: Vec<String>,
    pub metadata: bool,
}

impl SchemaFilters {
    /// Folds decoded query pairs. `engines` may repeat (`engines[]` is
    /// accepted too); `metadata` is on unless given as anything other than `true`.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut engines = Vec::new();
        let mut metadata = None;

        for (key, value) in pairs {
            match key.as_str() {
                "engines" | "engines[]" if !value.is_empty() => engines.push(value),
                "metadata" if metadata.is_none() => metadata = Some(value == "true"),
                _ => {}
            }
        }

        Self {
            engines,
            metadata: metadata.unwrap_or(true),
        }
    }

    pub fn options(&self) -> DatabaseSchemaOptions {
        DatabaseSchemaOptions {
            engines: self.engines.clone(),
            include_metadata: self.metadata,
        }
    }
}
