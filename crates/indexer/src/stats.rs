//! Serializable statistics for one index build.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildStats {
    pub indexer_version: String,
    pub units_total: usize,
    pub units_parsed: usize,
    pub units_skipped: usize,
    pub units_failed: usize,
    pub namespace_count: usize,
    pub member_count: usize,
    pub constant_count: usize,
    pub alias_count: usize,
    pub diagnostic_count: usize,
    pub parse_duration_seconds: f64,
    pub merge_duration_seconds: f64,
    pub resolve_duration_seconds: f64,
    pub total_duration_seconds: f64,
}

impl BuildStats {
    pub fn new() -> Self {
        Self {
            indexer_version: env!("CARGO_PKG_VERSION").to_string(),
            ..Self::default()
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "{} namespaces, {} members, {} constants from {}/{} units in {:.3}s ({} diagnostics)",
            self.namespace_count,
            self.member_count,
            self.constant_count,
            self.units_parsed,
            self.units_total,
            self.total_duration_seconds,
            self.diagnostic_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_stamped() {
        let stats = BuildStats::new();
        assert_eq!(stats.indexer_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_summary_mentions_counts() {
        let stats = BuildStats {
            namespace_count: 3,
            member_count: 12,
            units_parsed: 2,
            units_total: 2,
            ..BuildStats::new()
        };
        let summary = stats.format_summary();
        assert!(summary.contains("3 namespaces"));
        assert!(summary.contains("2/2 units"));
    }
}
