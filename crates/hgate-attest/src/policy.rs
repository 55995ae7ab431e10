#![forbid(unsafe_code)]
extern crate alloc;
use alloc::vec::Vec;

/// Caller-supplied PCR acceptance policy.
///
/// A signature only proves the packet is genuine; whether the measured
/// state it reports is acceptable is a relying-party decision, so the
/// comparison is injected rather than hardwired.
pub trait PcrPolicy: Send + Sync {
    fn allows(&self, pcr: &[u8; 32]) -> bool;
}

/// Explicit opt-out: accept any measured state.
/// Callers who want the reference tool's display-only behavior must name
/// that choice rather than get it silently.
pub struct AcceptAny;

impl PcrPolicy for AcceptAny {
    fn allows(&self, _pcr: &[u8; 32]) -> bool {
        true
    }
}

/// Accept only PCR values from a golden set.
pub struct AllowList {
    golden: Vec<[u8; 32]>,
}

impl AllowList {
    pub fn new(golden: Vec<[u8; 32]>) -> Self {
        Self { golden }
    }
}

impl PcrPolicy for AllowList {
    fn allows(&self, pcr: &[u8; 32]) -> bool {
        self.golden.iter().any(|g| g == pcr)
    }
}
