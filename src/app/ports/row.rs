//! Transport-neutral result rows.
//!
//! The native protocol yields typed values; the text protocol yields strings.
//! Getters coerce text into the requested shape so callers never care which.

use super::metadata_source::SourceError;

/// Text-protocol marker for a null field.
pub const NULL_SENTINEL: &str = "\\N";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Null,
    Text(String),
    UInt(u64),
    Array(Vec<String>),
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<Option<u64>> for Field {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Self::Null, Self::UInt)
    }
}

impl From<Vec<String>> for Field {
    fn from(value: Vec<String>) -> Self {
        Self::Array(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<Field>,
}

impl Row {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn field(&self, index: usize) -> Result<&Field, SourceError> {
        self.fields.get(index).ok_or_else(|| {
            SourceError::Malformed(format!(
                "column {index} requested from a row of {} fields",
                self.fields.len()
            ))
        })
    }

    /// Null reads as an empty string.
    pub fn text(&self, index: usize) -> Result<String, SourceError> {
        match self.field(index)? {
            Field::Null => Ok(String::new()),
            Field::Text(value) => Ok(value.clone()),
            Field::UInt(value) => Ok(value.to_string()),
            Field::Array(_) => Err(SourceError::Malformed(format!(
                "column {index}: expected text, found array"
            ))),
        }
    }

    /// Null, the null sentinel and empty text all read as `None`.
    pub fn opt_u64(&self, index: usize) -> Result<Option<u64>, SourceError> {
        match self.field(index)? {
            Field::Null => Ok(None),
            Field::UInt(value) => Ok(Some(*value)),
            Field::Text(value) if value.is_empty() || value == NULL_SENTINEL => Ok(None),
            Field::Text(value) => value.parse().map(Some).map_err(|_| {
                SourceError::Malformed(format!("column {index}: '{value}' is not an unsigned integer"))
            }),
            Field::Array(_) => Err(SourceError::Malformed(format!(
                "column {index}: expected integer, found array"
            ))),
        }
    }

    pub fn u64(&self, index: usize) -> Result<u64, SourceError> {
        self.opt_u64(index)?.ok_or_else(|| {
            SourceError::Malformed(format!("column {index}: unexpected null"))
        })
    }

    /// Null reads as an empty list; text is parsed as an array literal.
    pub fn strings(&self, index: usize) -> Result<Vec<String>, SourceError> {
        match self.field(index)? {
            Field::Null => Ok(Vec::new()),
            Field::Array(values) => Ok(values.clone()),
            Field::Text(value) => parse_array_literal(value),
            Field::UInt(_) => Err(SourceError::Malformed(format!(
                "column {index}: expected array, found integer"
            ))),
        }
    }
}

/// Parses `['a','b']` into its elements. Quoted elements may contain commas
/// and backslash escapes; unquoted elements are taken verbatim.
pub fn parse_array_literal(text: &str) -> Result<Vec<String>, SourceError> {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return Err(SourceError::Malformed(format!(
            "'{trimmed}' is not an array literal"
        )));
    };
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '\'' => in_quotes = !in_quotes,
            ',' if !in_quotes => items.push(std::mem::take(&mut current)),
            c if in_quotes || !c.is_whitespace() => current.push(c),
            _ => {}
        }
    }
    if in_quotes {
        return Err(SourceError::Malformed(format!(
            "unterminated string in array literal '{trimmed}'"
        )));
    }
    items.push(current);
    Ok(items)
}
