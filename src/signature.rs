//! ECDSA P-384 / SHA-384 signatures over PAE-encoded input.
//!
//! Signing uses RFC 6979 deterministic nonces, so the same key and input
//! always produce the same signature. Verification accepts any valid
//! signature, including high-S ones produced by randomized signers.

use std::fmt;

use p384::ecdsa::{
    self,
    signature::{Signer, Verifier},
};

use crate::error::{PasetoError, Result};
use crate::keys::{PublicKey, SecretKey};

/// Length in bytes of a `r || s` signature.
pub const SIGNATURE_LENGTH: usize = 96;

/// A fixed-length `r || s` signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("length", &SIGNATURE_LENGTH)
            .finish_non_exhaustive()
    }
}

/// Sign PAE-encoded bytes.
///
/// # Arguments
/// * `secret_key` - The signing key
/// * `pae` - Output of [`crate::pae::pae_encode_v3_public`]
///
/// # Returns
/// The fixed-width `r || s` signature, 48 bytes each, big-endian
///
/// # Security
/// Nonces are derived per RFC 6979 from the key and message, so signing the
/// same bytes twice gives the same signature and no RNG is consulted.
pub fn sign(secret_key: &SecretKey, pae: &[u8]) -> Signature {
    let signature: ecdsa::Signature = secret_key.signing_key().sign(pae);

    let mut out = [0u8; SIGNATURE_LENGTH];
    out.copy_from_slice(&signature.to_bytes());
    Signature(out)
}

/// Verify a signature over PAE-encoded bytes.
///
/// Returns `Ok(false)` for any signature that does not verify, including
/// ones whose `r` or `s` are out of range. Only a wrong length is an error.
pub fn verify(public_key: &PublicKey, pae: &[u8], signature: &[u8]) -> Result<bool> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(PasetoError::MalformedSignature {
            expected: SIGNATURE_LENGTH,
            actual: signature.len(),
        });
    }

    let Ok(signature) = ecdsa::Signature::from_slice(signature) else {
        return Ok(false);
    };

    Ok(public_key.verifying_key().verify(pae, &signature).is_ok())
}
