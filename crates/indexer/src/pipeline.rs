//! End-to-end build: parallel parse, deterministic merge, resolution.
//!
//! Units parse concurrently on a bounded pool; merge applies the outcomes
//! sequentially in unit-name order so two builds over the same units produce
//! the same index whatever the input order or thread timing.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

use stub_parser::{ParseOutcome, UnitParser};

use crate::builder::SymbolTableBuilder;
use crate::config::BuildConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::index::StubIndex;
use crate::resolver;
use crate::source::UnitSource;
use crate::stats::BuildStats;

pub struct BuildResult {
    pub index: Arc<StubIndex>,
    pub diagnostics: Diagnostics,
    pub stats: BuildStats,
}

pub struct StubIndexer {
    config: BuildConfig,
}

impl StubIndexer {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build an index from every unit the source supplies.
    ///
    /// Only a source that cannot supply units at all fails the invocation;
    /// parse failures, oversized units, and resolution problems land in the
    /// returned diagnostics next to a still-queryable index.
    pub fn build<S: UnitSource>(&self, source: &S) -> Result<BuildResult> {
        let total_start = Instant::now();
        let mut stats = BuildStats::new();
        let mut diagnostics = Diagnostics::new();

        let units = source
            .units(&self.config)
            .map_err(|e| anyhow::anyhow!("failed to collect stub units: {e}"))?;
        stats.units_total = units.len();
        info!(
            "building stub index from {} units with {} worker threads",
            units.len(),
            self.config.worker_threads
        );

        let (units, oversized): (Vec<_>, Vec<_>) = units
            .into_iter()
            .partition(|unit| unit.size() <= self.config.max_unit_size);
        stats.units_skipped = oversized.len();
        for unit in &oversized {
            warn!(
                "skipping unit `{}`: {} bytes over the {} byte limit",
                unit.name,
                unit.size(),
                self.config.max_unit_size
            );
            diagnostics.push(Diagnostic::unit_too_large(
                &unit.name,
                unit.size(),
                self.config.max_unit_size,
            ));
        }

        let parse_start = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads)
            .build()
            .context("failed to build parser thread pool")?;
        let mut outcomes: Vec<ParseOutcome> = pool.install(|| {
            units
                .par_iter()
                .map(|unit| UnitParser::new(unit.name.as_str(), &unit.text).parse())
                .collect()
        });
        stats.parse_duration_seconds = parse_start.elapsed().as_secs_f64();

        // fixed merge order keeps last-write-wins deterministic
        outcomes.sort_by(|a, b| a.unit_name().cmp(b.unit_name()));

        let merge_start = Instant::now();
        let mut builder = SymbolTableBuilder::new();
        for outcome in &outcomes {
            match outcome {
                ParseOutcome::Parsed(parsed) => {
                    builder.apply_unit(parsed, &mut diagnostics);
                    stats.units_parsed += 1;
                }
                ParseOutcome::Failed(failed) => {
                    warn!("unit `{}` failed to parse: {}", failed.unit_name, failed.error);
                    diagnostics.push(Diagnostic::parse_error(&failed.unit_name, &failed.error));
                    stats.units_failed += 1;
                }
            }
        }
        let mut index = builder.finish();
        stats.merge_duration_seconds = merge_start.elapsed().as_secs_f64();

        let resolve_start = Instant::now();
        resolver::resolve(&mut index, &mut diagnostics);
        index.rebuild_member_table();
        stats.resolve_duration_seconds = resolve_start.elapsed().as_secs_f64();

        stats.namespace_count = index.namespace_count();
        stats.member_count = index.member_count();
        stats.constant_count = index.constant_count();
        stats.alias_count = index.alias_count();
        stats.diagnostic_count = diagnostics.len();
        stats.total_duration_seconds = total_start.elapsed().as_secs_f64();
        info!("stub index built: {}", stats.format_summary());

        Ok(BuildResult {
            index: Arc::new(index),
            diagnostics,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfigBuilder;
    use crate::diagnostics::DiagnosticKind;
    use crate::source::{MemoryUnitSource, StubUnit};
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_build_logs_stage_summary() {
        let source = MemoryUnitSource::from_pairs(&[(
            "date.rb",
            "class Date\n  def year() end\nend\n",
        )]);
        let result = StubIndexer::new(BuildConfigBuilder::build(1))
            .build(&source)
            .unwrap();

        assert_eq!(result.stats.units_parsed, 1);
        assert!(logs_contain("building stub index from 1 units"));
        assert!(logs_contain("stub index built"));
    }

    #[test]
    fn test_failed_unit_does_not_suppress_siblings() {
        let source = MemoryUnitSource::from_pairs(&[
            ("bad.rb", "class Broken\n"),
            ("good.rb", "class Good\n  def fine() end\nend\n"),
        ]);
        let result = StubIndexer::new(BuildConfigBuilder::build(2))
            .build(&source)
            .unwrap();

        assert_eq!(result.stats.units_failed, 1);
        assert_eq!(result.stats.units_parsed, 1);
        assert!(result.index.find("Good").is_some());
        assert!(result.index.find("Broken").is_none());
        assert_eq!(result.diagnostics.count_of(DiagnosticKind::ParseError), 1);
    }

    #[test]
    fn test_oversized_unit_skipped_with_diagnostic() {
        let indexer = StubIndexer::new(BuildConfig {
            worker_threads: 1,
            max_unit_size: 16,
        });
        let source = MemoryUnitSource::new(vec![
            StubUnit::new("small.rb", "class A\nend\n"),
            StubUnit::new("big.rb", "class Bbbbbbbbbbbbbbbbbbbbbbbb\nend\n"),
        ]);
        let result = indexer.build(&source).unwrap();

        assert_eq!(result.stats.units_skipped, 1);
        assert!(result.index.find("A").is_some());
        assert_eq!(result.index.namespace_count(), 1);
        assert_eq!(result.diagnostics.count_of(DiagnosticKind::UnitTooLarge), 1);
    }

    #[test]
    fn test_merge_order_is_unit_name_order_not_input_order() {
        let forward = MemoryUnitSource::from_pairs(&[
            ("a.rb", "class Foo\n  def bar(x) end\nend\n"),
            ("b.rb", "class Foo\n  def bar(x, y) end\nend\n"),
        ]);
        let reversed = MemoryUnitSource::from_pairs(&[
            ("b.rb", "class Foo\n  def bar(x, y) end\nend\n"),
            ("a.rb", "class Foo\n  def bar(x) end\nend\n"),
        ]);
        let indexer = StubIndexer::new(BuildConfigBuilder::build(2));

        for source in [&forward, &reversed] {
            let result = indexer.build(source).unwrap();
            let foo = result.index.find("Foo").unwrap();
            // b.rb merges after a.rb in both cases
            assert_eq!(foo.members[0].params.len(), 2);
        }
    }
}
