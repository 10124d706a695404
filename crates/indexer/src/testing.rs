//! Test helpers for building small indexes from inline stub text.

use crate::config::BuildConfigBuilder;
use crate::pipeline::{BuildResult, StubIndexer};
use crate::source::MemoryUnitSource;

/// Build an index from `(unit name, stub text)` pairs on one thread.
pub fn build_from_pairs(pairs: &[(&str, &str)]) -> BuildResult {
    let source = MemoryUnitSource::from_pairs(pairs);
    StubIndexer::new(BuildConfigBuilder::build(1))
        .build(&source)
        .expect("in-memory build cannot fail")
}
