#![no_std]
#![forbid(unsafe_code)]

pub mod policy;

use hgate_core::{AttestationPacket, AttestationResult, HgError};
use hgate_crypto::verify_detached;
use hgate_store::CounterStore;
use policy::PcrPolicy;

/// Verify one attestation packet against a device public key.
///
/// Order matters: structural validity gates everything (no signature math
/// on a packet too short to carry its fixed fields), the signature gates
/// all state reads, and the counter store is mutated only after every
/// other check has passed.
pub fn verify_attestation(
    public_key: &[u8],
    packet: &[u8],
    signature: &[u8],
    store: &mut CounterStore,
    policy: &dyn PcrPolicy,
) -> AttestationResult {
    let parsed = match AttestationPacket::parse(packet) {
        Ok(p) => p,
        Err(e) => return AttestationResult::rejected(e),
    };

    // The signature covers the whole packet, reserved tail included.
    if let Err(e) = verify_detached(public_key, packet, signature) {
        return AttestationResult::rejected(e);
    }

    if !policy.allows(&parsed.pcr) {
        return rejected_after_parse(&parsed, HgError::PcrRejected);
    }

    // Anti-rollback. Signature validity proves authenticity, not
    // freshness: a captured genuine packet replayed later dies here.
    // verify_detached already established the key is 32 bytes.
    let key: [u8; 32] = match public_key.try_into() {
        Ok(k) => k,
        Err(_) => return AttestationResult::rejected(HgError::MalformedKeyOrSignature),
    };
    if let Err(e) = store.advance(&key, parsed.counter) {
        return rejected_after_parse(&parsed, e);
    }

    AttestationResult {
        valid: true,
        counter: parsed.counter,
        pcr: parsed.pcr,
        reason: None,
    }
}

fn rejected_after_parse(packet: &AttestationPacket<'_>, reason: HgError) -> AttestationResult {
    AttestationResult {
        valid: false,
        counter: packet.counter,
        pcr: packet.pcr,
        reason: Some(reason),
    }
}
