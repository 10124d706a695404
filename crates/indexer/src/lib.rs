//! Builds an immutable symbol index from Ruby stub declaration units.
//!
//! The pipeline parses units in parallel with `stub-parser`, merges their
//! declaration streams into a namespace tree in a deterministic order,
//! resolves aliases and ancestry, and returns the finished [`StubIndex`]
//! together with the build [`Diagnostics`] and [`BuildStats`].

pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod index;
pub mod pipeline;
pub mod resolver;
pub mod source;
pub mod stats;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;


pub use config::{BuildConfig, BuildConfigBuilder};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use index::{
    AliasLink, AliasState, Constant, Member, MemberKey, Namespace, NamespaceId, SourceLocation,
    StubIndex,
};
pub use pipeline::{BuildResult, StubIndexer};
pub use source::{MemoryUnitSource, StubUnit, UnitSource};
pub use stats::BuildStats;
