#![forbid(unsafe_code)]
extern crate alloc;
use alloc::collections::BTreeMap;
use hgate_core::HgResult;

/// Abstract interface for per-device counter records, keyed by the raw
/// 32-byte device public key.
pub trait CounterBackend: Send + Sync {
    /// Last accepted counter for this key, None if the key is unseen.
    fn load(&self, key: &[u8; 32]) -> HgResult<Option<u64>>;

    /// Record a newly accepted counter.
    /// MUST be durable (fsync) before returning on persistent media.
    fn store(&mut self, key: &[u8; 32], counter: u64) -> HgResult<()>;
}

/// Volatile backend. Counters do not survive the process; acceptable for
/// a one-shot verifier and for tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: BTreeMap<[u8; 32], u64>,
}

impl CounterBackend for MemoryBackend {
    fn load(&self, key: &[u8; 32]) -> HgResult<Option<u64>> {
        Ok(self.records.get(key).copied())
    }

    fn store(&mut self, key: &[u8; 32], counter: u64) -> HgResult<()> {
        self.records.insert(*key, counter);
        Ok(())
    }
}
