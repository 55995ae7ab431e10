#![no_std]
#![forbid(unsafe_code)]
#[cfg(feature = "std")]
extern crate std;

pub mod backend;
#[cfg(feature = "std")]
pub mod fs_backend;

extern crate alloc;

use alloc::boxed::Box;
use backend::CounterBackend;
use hgate_core::{HgError, HgResult};

pub use backend::MemoryBackend;

/// Per-device monotonic counter records.
///
/// This is the only state in the verifier that outlives a single call.
/// The whole load -> compare -> store sequence runs behind one `&mut`
/// borrow, so two in-flight verifications for the same device cannot
/// interleave; a concurrent embedder wraps the store in its own lock.
pub struct CounterStore {
    backend: Box<dyn CounterBackend>,
}

impl CounterStore {
    pub fn new(backend: Box<dyn CounterBackend>) -> Self {
        Self { backend }
    }

    /// In-memory store for single-run verification and tests.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::default()))
    }

    /// Last accepted counter for this device key, if any.
    pub fn last(&self, key: &[u8; 32]) -> HgResult<Option<u64>> {
        self.backend.load(key)
    }

    /// Accept `counter` iff it strictly exceeds every previously accepted
    /// value for `key`. Equality is rejected: replaying the identical
    /// packet is itself a rollback of freshness. A first-ever counter for
    /// an unseen key is accepted at any value.
    pub fn advance(&mut self, key: &[u8; 32], counter: u64) -> HgResult<()> {
        if let Some(last) = self.backend.load(key)? {
            if counter <= last {
                return Err(HgError::CounterRegression);
            }
        }
        self.backend.store(key, counter)
    }
}
