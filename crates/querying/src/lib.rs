//! Read-only query surface over a built stub index.
//!
//! The four lookup operations (find namespace, list members, resolve alias,
//! prefix search) run lock-free against an immutable [`indexer::StubIndex`]
//! snapshot; [`IndexSnapshot`] swaps a fresh snapshot in after a rebuild
//! without disturbing readers in flight.

pub mod service;
pub mod snapshot;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod types;

pub use service::{PrefixSearch, QueryService};
pub use snapshot::IndexSnapshot;
pub use types::{
    AliasResolution, ConstantRecord, ListMembersOptions, MemberRecord, NamespaceRecord,
    ParamRecord, SearchHit, SourceRecord,
};
