use serde::Serialize;

/// One column of a table as reported by `system.columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub position: u64,
    pub comment: String,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, position: u64) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            position,
            comment: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.data_type.starts_with("Nullable(")
    }
}
