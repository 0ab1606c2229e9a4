mod config;
mod generation;
mod table_cache;

pub use config::{CacheConfig, DEFAULT_DENYLIST};
pub use generation::{CacheGeneration, DatabaseIndex};
pub use table_cache::{TABLES_QUERY_COLUMNS, TableCache};
