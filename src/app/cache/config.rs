use std::time::Duration;

use crate::domain::QualifiedName;

/// Warehouse-internal databases never shown to clients.
pub const DEFAULT_DENYLIST: [&str; 5] = [
    "system",
    "information_schema",
    "INFORMATION_SCHEMA",
    "performance_schema",
    "mysql",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    /// Deadline for the bulk metadata query of one refresh.
    pub refresh_timeout: Duration,
    pub denylist: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            refresh_timeout: Duration::from_secs(30),
            denylist: DEFAULT_DENYLIST.iter().map(ToString::to_string).collect(),
        }
    }
}

impl CacheConfig {
    /// Empty names and exact denylist entries are excluded. Database names
    /// are case-sensitive, so both `information_schema` spellings are listed.
    pub fn is_denied(&self, database: &str) -> bool {
        database.is_empty() || self.denylist.iter().any(|denied| denied == database)
    }

    /// Like `is_denied` for an edge endpoint, but an endpoint without a
    /// database part is kept.
    pub fn denies_endpoint(&self, qualified_name: &str) -> bool {
        let name = QualifiedName::parse(qualified_name);
        !name.database.is_empty() && self.is_denied(&name.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("system", true)]
    #[case("information_schema", true)]
    #[case("INFORMATION_SCHEMA", true)]
    #[case("System", false)]
    #[case("MySQL", false)]
    #[case("Information_Schema", false)]
    #[case("performance_schema", true)]
    #[case("mysql", true)]
    #[case("", true)]
    #[case("analytics", false)]
    #[case("system_logs", false)]
    fn is_denied_cases(#[case] database: &str, #[case] denied: bool) {
        assert_eq!(CacheConfig::default().is_denied(database), denied);
    }

    #[test]
    fn endpoint_without_database_is_kept() {
        let config = CacheConfig::default();

        assert!(!config.denies_endpoint("orphan"));
        assert!(config.denies_endpoint("system.numbers"));
        assert!(!config.denies_endpoint("analytics.events"));
    }
}
