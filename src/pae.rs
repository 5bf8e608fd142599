//! Pre-Authentication Encoding (PAE)
//!
//! PAE turns a list of byte strings into one unambiguous byte string. It is
//! the exact input handed to the signature engine, so the header, message,
//! footer and implicit assertion can never be shifted into one another.

use crate::error::{PasetoError, Result};

/// Encode a 64-bit unsigned integer as little-endian bytes
///
/// # Example
/// ```
/// use paseto_v3::pae::le64_encode;
///
/// let encoded = le64_encode(42);
/// assert_eq!(encoded, [42, 0, 0, 0, 0, 0, 0, 0]);
/// ```
pub fn le64_encode(n: u64) -> [u8; 8] {
    n.to_le_bytes()
}

fn encoded_length(len: usize) -> Result<[u8; 8]> {
    // The most significant bit of LE64 must stay clear.
    match u64::try_from(len) {
        Ok(n) if n >> 63 == 0 => Ok(le64_encode(n)),
        _ => Err(PasetoError::PaeLengthOverflow { length: len }),
    }
}

/// Pre-Authentication Encoding
///
/// `PAE(pieces) = LE64(n) || LE64(len(p1)) || p1 || ... || LE64(len(pn)) || pn`
///
/// # Example
/// ```
/// use paseto_v3::pae::pae_encode;
///
/// let result = pae_encode(&[b"hello", b"world"]).unwrap();
/// assert_eq!(result.len(), 8 + (8 + 5) + (8 + 5));
/// ```
pub fn pae_encode(pieces: &[&[u8]]) -> Result<Vec<u8>> {
    let total_size = pieces
        .iter()
        .fold(8usize, |acc, piece| acc.saturating_add(8).saturating_add(piece.len()));

    let mut result = Vec::with_capacity(total_size);
    result.extend_from_slice(&encoded_length(pieces.len())?);

    for piece in pieces {
        result.extend_from_slice(&encoded_length(piece.len())?);
        result.extend_from_slice(piece);
    }

    Ok(result)
}

/// Build the signing input of a `v3.public` token:
/// `PAE([public_key, header, message, footer, implicit_assertion])`.
///
/// An absent footer or implicit assertion is passed as an empty slice.
pub fn pae_encode_v3_public(
    public_key: &[u8],
    header: &[u8],
    message: &[u8],
    footer: &[u8],
    implicit_assertion: &[u8],
) -> Result<Vec<u8>> {
    pae_encode(&[public_key, header, message, footer, implicit_assertion])
}
