#![no_std]
#![forbid(unsafe_code)]
#[cfg(feature = "std")]
extern crate std;

/// Literal tag opening every signed boot image.
pub const IMAGE_MAGIC: [u8; 4] = *b"HGAT";

pub const PUBLIC_KEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;
pub const DIGEST_LEN: usize = 32;

pub type HgResult<T> = Result<T, HgError>;

/// Verification failure taxonomy. Every expected failure mode is a
/// distinct variant; the core never panics on bad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HgError {
    /// Key or signature buffer is structurally unusable (wrong length,
    /// off-curve point). Distinct from a cryptographic mismatch.
    MalformedKeyOrSignature,
    TruncatedPacket,
    /// The bytes do not verify under the given key. Forgery or tampering.
    SignatureMismatch,
    /// Counter at or below the last accepted value for this device.
    CounterRegression,
    TruncatedHeader,
    BadMagic,
    PayloadHashMismatch,
    /// PCR value refused by the caller-supplied policy.
    PcrRejected,
    /// Counter store backend I/O failure.
    StoreIo,
}

impl HgError {
    /// True for the failures that indicate an active attack (forgery,
    /// replay) rather than a format or environment problem.
    pub fn is_trust_failure(&self) -> bool {
        matches!(self, HgError::SignatureMismatch | HgError::CounterRegression)
    }
}

impl core::fmt::Display for HgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HgError {}

/// Attestation packet wire layout. Signed as a whole, signature detached.
///
/// | offset | len | field   |
/// |--------|-----|---------|
/// | 0      | 8   | counter (u64 LE) |
/// | 8      | 32  | pcr     |
/// | 40     | ..  | extra (reserved, unparsed, still signed) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttestationPacket<'a> {
    pub counter: u64,
    pub pcr: [u8; 32],
    pub extra: &'a [u8],
}

impl<'a> AttestationPacket<'a> {
    pub const MIN_LEN: usize = 40;

    pub fn parse(buf: &'a [u8]) -> HgResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(HgError::TruncatedPacket);
        }
        Ok(Self {
            counter: u64::from_le_bytes(buf[0..8].try_into().unwrap()),
            pcr: buf[8..40].try_into().unwrap(),
            extra: &buf[40..],
        })
    }
}

/// Signed image header. The signature covers `payload_hash`, not the
/// payload itself; the hash covers the payload. Two-link chain.
///
/// | offset | len | field        |
/// |--------|-----|--------------|
/// | 0      | 4   | magic `HGAT` |
/// | 4      | 64  | signature    |
/// | 68     | 32  | payload_hash |
/// | 100    | ..  | payload      |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub signature: [u8; SIGNATURE_LEN],
    pub payload_hash: [u8; DIGEST_LEN],
}

impl ImageHeader {
    pub const SIZE: usize = 100;

    pub fn parse(buf: &[u8]) -> HgResult<Self> {
        if buf.len() < Self::SIZE {
            return Err(HgError::TruncatedHeader);
        }
        // Format check comes before any cryptography.
        if buf[0..4] != IMAGE_MAGIC {
            return Err(HgError::BadMagic);
        }
        Ok(Self {
            signature: buf[4..68].try_into().unwrap(),
            payload_hash: buf[68..100].try_into().unwrap(),
        })
    }
}

/// Outcome of one attestation verification call. Built fresh per call.
/// `counter` and `pcr` are zero when the failure predates parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttestationResult {
    pub valid: bool,
    pub counter: u64,
    pub pcr: [u8; 32],
    pub reason: Option<HgError>,
}

impl AttestationResult {
    pub fn rejected(reason: HgError) -> Self {
        Self { valid: false, counter: 0, pcr: [0u8; 32], reason: Some(reason) }
    }
}

/// Outcome of one image verification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageResult {
    pub valid: bool,
    pub payload_sha256: [u8; DIGEST_LEN],
    pub reason: Option<HgError>,
}

impl ImageResult {
    pub fn rejected(reason: HgError) -> Self {
        Self { valid: false, payload_sha256: [0u8; 32], reason: Some(reason) }
    }
}
