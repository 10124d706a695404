//! Build configuration.

/// Knobs for one index build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Worker threads for the parse stage.
    pub worker_threads: usize,
    /// Units larger than this are skipped with a diagnostic.
    pub max_unit_size: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfigBuilder::build(0)
    }
}

pub struct BuildConfigBuilder;

impl BuildConfigBuilder {
    pub fn build(threads: usize) -> BuildConfig {
        let effective_threads = BuildConfigBuilder::get_effective_threads(threads);
        BuildConfig {
            worker_threads: effective_threads,
            max_unit_size: 5_000_000,
        }
    }

    pub fn get_effective_threads(threads: usize) -> usize {
        if threads == 0 { num_cpus::get() } else { threads }
    }
}
