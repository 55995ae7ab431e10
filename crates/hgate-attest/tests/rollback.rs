use hgate_attest::policy::{AcceptAny, AllowList};
use hgate_attest::verify_attestation;
use hgate_core::HgError;
use hgate_crypto::SigningIdentity;
use hgate_store::CounterStore;
use rand_core::OsRng;

fn packet(counter: u64, pcr: [u8; 32]) -> Vec<u8> {
    let mut p = Vec::with_capacity(40);
    p.extend_from_slice(&counter.to_le_bytes());
    p.extend_from_slice(&pcr);
    p
}

#[test]
fn test_counter_5_then_replay() {
    let id = SigningIdentity::generate(&mut OsRng);
    let mut store = CounterStore::in_memory();
    let pkt = packet(5, [0xAA; 32]);
    let sig = id.sign(&pkt);

    let res = verify_attestation(&id.public_key(), &pkt, &sig, &mut store, &AcceptAny);
    assert!(res.valid);
    assert_eq!(res.counter, 5);
    assert_eq!(res.pcr, [0xAA; 32]);
    assert_eq!(res.reason, None);

    // Identical packet and signature again: genuine but stale.
    let replay = verify_attestation(&id.public_key(), &pkt, &sig, &mut store, &AcceptAny);
    assert!(!replay.valid);
    assert_eq!(replay.reason, Some(HgError::CounterRegression));
}

#[test]
fn test_counter_must_strictly_increase() {
    let id = SigningIdentity::generate(&mut OsRng);
    let mut store = CounterStore::in_memory();

    for (counter, expect_valid) in [(5u64, true), (6, true), (6, false), (3, false), (7, true)] {
        let pkt = packet(counter, [0x00; 32]);
        let sig = id.sign(&pkt);
        let res = verify_attestation(&id.public_key(), &pkt, &sig, &mut store, &AcceptAny);
        assert_eq!(res.valid, expect_valid, "counter {}", counter);
        if !expect_valid {
            assert_eq!(res.reason, Some(HgError::CounterRegression));
        }
    }
}

#[test]
fn test_first_seen_key_accepts_zero() {
    let id = SigningIdentity::generate(&mut OsRng);
    let mut store = CounterStore::in_memory();
    let pkt = packet(0, [0x01; 32]);
    let sig = id.sign(&pkt);
    let res = verify_attestation(&id.public_key(), &pkt, &sig, &mut store, &AcceptAny);
    assert!(res.valid);
    assert_eq!(res.counter, 0);
}

#[test]
fn test_truncated_packet_gates_signature() {
    let id = SigningIdentity::generate(&mut OsRng);
    let mut store = CounterStore::in_memory();

    // 39 bytes with a garbage signature: the failure must be structural,
    // no signature check is attempted.
    let short = vec![0u8; 39];
    let res = verify_attestation(&id.public_key(), &short, &[0u8; 64], &mut store, &AcceptAny);
    assert!(!res.valid);
    assert_eq!(res.reason, Some(HgError::TruncatedPacket));
}

#[test]
fn test_tampered_packet_is_trust_broken() {
    let id = SigningIdentity::generate(&mut OsRng);
    let mut store = CounterStore::in_memory();
    let pkt = packet(9, [0xCC; 32]);
    let sig = id.sign(&pkt);

    let mut tampered = pkt.clone();
    tampered[0] ^= 0x01; // counter bumped after signing
    let res = verify_attestation(&id.public_key(), &tampered, &sig, &mut store, &AcceptAny);
    assert_eq!(res.reason, Some(HgError::SignatureMismatch));
    assert!(res.reason.unwrap().is_trust_failure());

    // Nothing was recorded for this device.
    assert_eq!(store.last(&id.public_key()).unwrap(), None);
}

#[test]
fn test_signature_covers_reserved_tail() {
    let id = SigningIdentity::generate(&mut OsRng);
    let mut store = CounterStore::in_memory();

    let mut pkt = packet(1, [0xEE; 32]);
    pkt.extend_from_slice(b"future payload fields");
    let sig = id.sign(&pkt);

    let res = verify_attestation(&id.public_key(), &pkt, &sig, &mut store, &AcceptAny);
    assert!(res.valid, "extra bytes are legal when signed");

    let mut tampered = pkt.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0xFF;
    let res = verify_attestation(&id.public_key(), &tampered, &sig, &mut store, &AcceptAny);
    assert_eq!(res.reason, Some(HgError::SignatureMismatch));
}

#[test]
fn test_malformed_key_is_not_a_forgery() {
    let id = SigningIdentity::generate(&mut OsRng);
    let mut store = CounterStore::in_memory();
    let pkt = packet(2, [0x00; 32]);
    let sig = id.sign(&pkt);

    let res = verify_attestation(&id.public_key()[..31], &pkt, &sig, &mut store, &AcceptAny);
    assert_eq!(res.reason, Some(HgError::MalformedKeyOrSignature));
}

#[test]
fn test_pcr_allowlist() {
    let id = SigningIdentity::generate(&mut OsRng);
    let mut store = CounterStore::in_memory();
    let pkt = packet(4, [0xAA; 32]);
    let sig = id.sign(&pkt);

    let policy = AllowList::new(vec![[0xBB; 32]]);
    let res = verify_attestation(&id.public_key(), &pkt, &sig, &mut store, &policy);
    assert!(!res.valid);
    assert_eq!(res.reason, Some(HgError::PcrRejected));
    assert_eq!(res.pcr, [0xAA; 32]); // parsed fields survive for diagnostics

    // A policy rejection must not burn the counter.
    let res = verify_attestation(&id.public_key(), &pkt, &sig, &mut store, &AcceptAny);
    assert!(res.valid);

    let policy = AllowList::new(vec![[0xAA; 32], [0xBB; 32]]);
    let pkt = packet(5, [0xAA; 32]);
    let sig = id.sign(&pkt);
    let res = verify_attestation(&id.public_key(), &pkt, &sig, &mut store, &policy);
    assert!(res.valid);
}
