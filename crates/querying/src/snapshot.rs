//! Atomic snapshot swapping for rebuilds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use indexer::StubIndex;
use log::debug;

use crate::service::QueryService;

/// Holds the current index for a long-lived consumer. Readers clone the
/// `Arc` and keep querying their snapshot while a rebuild installs a new
/// one; nobody ever observes a half-swapped index.
pub struct IndexSnapshot {
    current: RwLock<Arc<StubIndex>>,
    generation: AtomicU64,
}

impl IndexSnapshot {
    pub fn new(index: Arc<StubIndex>) -> Self {
        Self {
            current: RwLock::new(index),
            generation: AtomicU64::new(0),
        }
    }

    /// The current snapshot.
    pub fn load(&self) -> Arc<StubIndex> {
        self.current.read().unwrap().clone()
    }

    /// A query service over the current snapshot.
    pub fn query(&self) -> QueryService {
        QueryService::new(self.load())
    }

    /// Install a freshly built index and return the new generation number.
    pub fn install(&self, index: Arc<StubIndex>) -> u64 {
        *self.current.write().unwrap() = index;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("installed index snapshot generation {generation}");
        generation
    }

    /// Increments on every install; consumers compare it to detect a stale
    /// snapshot.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
