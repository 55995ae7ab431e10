#![no_std]
#![forbid(unsafe_code)]

use hgate_core::{HgError, HgResult, ImageHeader, ImageResult};
use hgate_crypto::{verify_detached, PayloadDigest};

/// Verify a signed boot image: header format, then the hash link, then
/// the signature link.
///
/// The signature covers the header's stated `payload_hash`, not the
/// payload, so the recomputed hash must match the stated one before the
/// signature means anything. A valid signature over a wrong stated hash
/// is still a rejection.
pub fn verify_image(public_key: &[u8], header: &[u8], payload: &[u8]) -> ImageResult {
    let parsed = match ImageHeader::parse(header) {
        Ok(h) => h,
        Err(e) => return ImageResult::rejected(e),
    };

    let mut digest = PayloadDigest::new();
    digest.update(payload);
    let computed = digest.finalize();

    if computed != parsed.payload_hash {
        return ImageResult {
            valid: false,
            payload_sha256: computed,
            reason: Some(HgError::PayloadHashMismatch),
        };
    }

    if let Err(e) = verify_detached(public_key, &parsed.payload_hash, &parsed.signature) {
        return ImageResult {
            valid: false,
            payload_sha256: computed,
            reason: Some(e),
        };
    }

    ImageResult {
        valid: true,
        payload_sha256: computed,
        reason: None,
    }
}

/// Split a whole image file into (header, payload).
pub fn split_image(image: &[u8]) -> HgResult<(&[u8], &[u8])> {
    if image.len() < ImageHeader::SIZE {
        return Err(HgError::TruncatedHeader);
    }
    Ok(image.split_at(ImageHeader::SIZE))
}
