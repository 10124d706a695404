//! Test helpers: build a service from inline stub text.

use std::sync::Arc;

use indexer::{BuildConfigBuilder, Diagnostics, MemoryUnitSource, StubIndex, StubIndexer};

use crate::service::QueryService;

/// Build an index from `(unit name, stub text)` pairs on one thread.
pub fn build_index_from_pairs(pairs: &[(&str, &str)]) -> (Arc<StubIndex>, Diagnostics) {
    let source = MemoryUnitSource::from_pairs(pairs);
    let result = StubIndexer::new(BuildConfigBuilder::build(1))
        .build(&source)
        .expect("in-memory build cannot fail");
    (result.index, result.diagnostics)
}

/// As [`build_index_from_pairs`], wrapped in a [`QueryService`].
pub fn service_from_pairs(pairs: &[(&str, &str)]) -> (QueryService, Diagnostics) {
    let (index, diagnostics) = build_index_from_pairs(pairs);
    (QueryService::new(index), diagnostics)
}
