use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use indexer::{BuildConfigBuilder, MemoryUnitSource, StubIndexer, StubUnit};

/// Synthetic corpus shaped like real stub files: classes with documented
/// methods, constants, and an alias or two each.
fn synthetic_units(count: usize) -> Vec<StubUnit> {
    (0..count)
        .map(|n| {
            let mut text = String::new();
            text.push_str(&format!("# Stub class number {n}.\nclass Gen{n}\n"));
            text.push_str("  VERSION = _\n");
            for m in 0..20 {
                text.push_str(&format!(
                    "  # Does thing {m}.\n  def method{m}(arg, opts = {{}}) end\n"
                ));
            }
            text.push_str("  alias first method0\n");
            text.push_str("  def self.build() end\nend\n");
            StubUnit::new(format!("gen{n}.rb"), text)
        })
        .collect()
}

fn bench_build_index(c: &mut Criterion) {
    testing::init_logging();
    let source = MemoryUnitSource::new(synthetic_units(200));

    c.bench_function("build_index_200_units", |b| {
        b.iter(|| {
            let indexer = StubIndexer::new(BuildConfigBuilder::build(0));
            black_box(indexer.build(&source).unwrap())
        })
    });
}

criterion_group!(benches, bench_build_index);
criterion_main!(benches);
