pub mod metadata_source;
pub mod renderer;
pub mod row;

pub use metadata_source::{MetadataSource, SourceError};
pub use renderer::DiagramRenderer;
pub use row::{Field, NULL_SENTINEL, Row, parse_array_literal};
