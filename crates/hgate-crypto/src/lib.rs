#![no_std]
#![forbid(unsafe_code)]

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use hgate_core::{HgError, HgResult, DIGEST_LEN, PUBLIC_KEY_LEN, SIGNATURE_LEN};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Verify a detached Ed25519 (RFC 8032) signature.
///
/// Length or curve problems in the key/signature buffers are reported as
/// `MalformedKeyOrSignature`; a well-formed signature that does not verify
/// is `SignatureMismatch`. Callers rely on that split to tell a
/// misbehaving collaborator apart from an attacker.
pub fn verify_detached(public_key: &[u8], message: &[u8], signature: &[u8]) -> HgResult<()> {
    let pk_array: [u8; PUBLIC_KEY_LEN] = public_key
        .try_into()
        .map_err(|_| HgError::MalformedKeyOrSignature)?;
    let vk = VerifyingKey::from_bytes(&pk_array).map_err(|_| HgError::MalformedKeyOrSignature)?;

    let sig_array: [u8; SIGNATURE_LEN] = signature
        .try_into()
        .map_err(|_| HgError::MalformedKeyOrSignature)?;
    let sig = Signature::from_bytes(&sig_array);

    vk.verify_strict(message, &sig)
        .map_err(|_| HgError::SignatureMismatch)
}

/// One-shot SHA-256.
pub fn sha256(payload: &[u8]) -> [u8; DIGEST_LEN] {
    Sha256::digest(payload).into()
}

/// Streaming SHA-256 for payloads too large to hold in one buffer.
#[derive(Default)]
pub struct PayloadDigest {
    hasher: Sha256,
}

impl PayloadDigest {
    pub fn new() -> Self {
        Self { hasher: Sha256::new() }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
    }

    pub fn finalize(self) -> [u8; DIGEST_LEN] {
        self.hasher.finalize().into()
    }
}

/// An Ed25519 signing identity, used by tests and packet/image authoring.
/// The secret half lives inside `SigningKey` and is zeroized on drop.
pub struct SigningIdentity {
    key: SigningKey,
}

impl SigningIdentity {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Self { key }
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self { key: SigningKey::from_bytes(seed) }
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.key.verifying_key().to_bytes()
    }

    /// Detached signature over `message`.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LEN] {
        self.key.sign(message).to_bytes()
    }
}
