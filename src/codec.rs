//! Token string format: `header || b64(message || signature) [ "." b64(footer) ]`.
//!
//! Decoding is strict: unpadded RFC 4648 base64url only, canonical trailing
//! bits, and at most one footer segment.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::{PasetoError, Result};
use crate::signature::{Signature, SIGNATURE_LENGTH};

/// Header of every `v3.public` token.
pub const V3_PUBLIC_HEADER: &str = "v3.public.";

/// Tokens larger than this are rejected before any decoding.
pub const MAX_TOKEN_SIZE: usize = 1024 * 1024;

/// The parts of a token string. Nothing here has been authenticated yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    message: Vec<u8>,
    signature: Vec<u8>,
    footer: Option<Vec<u8>>,
}

impl DecodedToken {
    /// The claims bytes as they appeared on the wire
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// The trailing 96 payload bytes
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// `None` when the token carries no footer segment at all.
    pub fn footer(&self) -> Option<&[u8]> {
        self.footer.as_deref()
    }

    /// Split into the message and footer, dropping the signature.
    pub fn into_message_and_footer(self) -> (Vec<u8>, Option<Vec<u8>>) {
        (self.message, self.footer)
    }
}

/// Assemble a token string.
///
/// A `Some` footer always produces a footer segment, even when empty.
pub fn encode(
    header: &str,
    message: &[u8],
    signature: &Signature,
    footer: Option<&[u8]>,
) -> String {
    let mut payload = Vec::with_capacity(message.len() + SIGNATURE_LENGTH);
    payload.extend_from_slice(message);
    payload.extend_from_slice(signature.as_bytes());

    let mut token = String::from(header);
    token.push_str(&URL_SAFE_NO_PAD.encode(&payload));

    if let Some(footer) = footer {
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(footer));
    }

    token
}

/// Split a token string into message, signature and footer bytes.
///
/// # Arguments
/// * `token` - The full token string
/// * `expected_header` - Literal the token must start with, e.g. [`V3_PUBLIC_HEADER`]
///
/// # Errors
/// * `TokenTooLarge` above the size limit
/// * `HeaderMismatch` if the prefix differs in any byte
/// * `MalformedEncoding` for padding, non-URL-safe characters, non-canonical
///   trailing bits or more than one footer segment
/// * `PayloadTooShort` if fewer than 96 bytes decode
pub fn decode(token: &str, expected_header: &'static str) -> Result<DecodedToken> {
    let (encoded_payload, encoded_footer) = split_segments(token, expected_header)?;

    let mut payload = decode_segment(encoded_payload, "payload")?;
    if payload.len() < SIGNATURE_LENGTH {
        return Err(PasetoError::PayloadTooShort {
            actual: payload.len(),
            minimum: SIGNATURE_LENGTH,
        });
    }

    let signature = payload.split_off(payload.len() - SIGNATURE_LENGTH);
    let footer = encoded_footer
        .map(|segment| decode_segment(segment, "footer"))
        .transpose()?;

    Ok(DecodedToken {
        message: payload,
        signature,
        footer,
    })
}

/// Read the footer of a token without verifying anything.
///
/// Useful for picking a key by identifier before verification. The
/// returned bytes must not be trusted.
pub fn untrusted_footer(token: &str, expected_header: &'static str) -> Result<Option<Vec<u8>>> {
    let (_, encoded_footer) = split_segments(token, expected_header)?;
    encoded_footer
        .map(|segment| decode_segment(segment, "footer"))
        .transpose()
}

fn split_segments<'a>(
    token: &'a str,
    expected_header: &'static str,
) -> Result<(&'a str, Option<&'a str>)> {
    if token.len() > MAX_TOKEN_SIZE {
        return Err(PasetoError::TokenTooLarge {
            size: token.len(),
            limit: MAX_TOKEN_SIZE,
        });
    }

    let body = token
        .strip_prefix(expected_header)
        .ok_or(PasetoError::HeaderMismatch {
            expected: expected_header,
        })?;

    let mut segments = body.split('.');
    let payload = segments.next().unwrap_or_default();
    let footer = segments.next();

    if segments.next().is_some() {
        return Err(PasetoError::MalformedEncoding(
            "Expected at most one footer segment".into(),
        ));
    }

    Ok((payload, footer))
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>> {
    if segment.contains('=') {
        return Err(PasetoError::MalformedEncoding(format!(
            "Padding characters in {name} segment"
        )));
    }

    URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        PasetoError::MalformedEncoding(format!("Invalid {name} encoding: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_signature() -> Signature {
        let keypair = crate::keys::KeyPair::generate(&mut rand::thread_rng()).unwrap();
        crate::signature::sign(keypair.secret_key(), b"anything")
    }

    #[test]
    fn test_encode_decode_without_footer() {
        let signature = sample_signature();
        let token = encode(V3_PUBLIC_HEADER, b"{\"a\":1}", &signature, None);

        assert!(token.starts_with("v3.public."));
        assert!(!token["v3.public.".len()..].contains('.'));

        let decoded = decode(&token, V3_PUBLIC_HEADER).unwrap();
        assert_eq!(decoded.message(), b"{\"a\":1}");
        assert_eq!(decoded.signature(), signature.as_bytes());
        assert_eq!(decoded.footer(), None);
    }

    #[test]
    fn test_empty_and_absent_footer_are_distinct() {
        let signature = sample_signature();

        let absent = encode(V3_PUBLIC_HEADER, b"m", &signature, None);
        let empty = encode(V3_PUBLIC_HEADER, b"m", &signature, Some(&b""[..]));

        assert_eq!(empty, format!("{absent}."));
        assert_eq!(decode(&absent, V3_PUBLIC_HEADER).unwrap().footer(), None);
        assert_eq!(
            decode(&empty, V3_PUBLIC_HEADER).unwrap().footer(),
            Some(&b""[..])
        );
    }

    #[test]
    fn test_footer_round_trip() {
        let signature = sample_signature();
        let token = encode(V3_PUBLIC_HEADER, b"m", &signature, Some(&b"{\"kid\":\"k1\"}"[..]));

        let decoded = decode(&token, V3_PUBLIC_HEADER).unwrap();
        assert_eq!(decoded.footer(), Some(&b"{\"kid\":\"k1\"}"[..]));
        assert_eq!(
            untrusted_footer(&token, V3_PUBLIC_HEADER).unwrap(),
            Some(b"{\"kid\":\"k1\"}".to_vec())
        );
    }

    #[test]
    fn test_header_mismatch() {
        let signature = sample_signature();
        let token = encode("v2.public.", b"m", &signature, None);

        assert_eq!(
            decode(&token, V3_PUBLIC_HEADER).unwrap_err(),
            PasetoError::HeaderMismatch {
                expected: V3_PUBLIC_HEADER
            }
        );
        assert!(matches!(
            decode("v3.local.AAAA", V3_PUBLIC_HEADER).unwrap_err(),
            PasetoError::HeaderMismatch { .. }
        ));
    }

    #[test]
    fn test_padding_is_rejected() {
        let signature = sample_signature();
        // 97 payload bytes need padding in standard base64
        let token = encode(V3_PUBLIC_HEADER, b"m", &signature, None);
        let padded = format!("{token}==");

        assert!(matches!(
            decode(&padded, V3_PUBLIC_HEADER).unwrap_err(),
            PasetoError::MalformedEncoding(_)
        ));

        let padded_footer = format!("{token}.YQ==");
        assert!(matches!(
            decode(&padded_footer, V3_PUBLIC_HEADER).unwrap_err(),
            PasetoError::MalformedEncoding(_)
        ));
    }

    #[test]
    fn test_standard_alphabet_is_rejected() {
        let payload = "+/".repeat(70);
        let token = format!("{V3_PUBLIC_HEADER}{payload}");

        assert!(matches!(
            decode(&token, V3_PUBLIC_HEADER).unwrap_err(),
            PasetoError::MalformedEncoding(_)
        ));
    }

    #[test]
    fn test_non_canonical_trailing_bits_are_rejected() {
        // "YR" decodes to 'a' only if trailing bits are ignored
        let signature = sample_signature();
        let token = encode(V3_PUBLIC_HEADER, b"m", &signature, None);

        assert!(matches!(
            decode(&format!("{token}.YR"), V3_PUBLIC_HEADER).unwrap_err(),
            PasetoError::MalformedEncoding(_)
        ));
    }

    #[test]
    fn test_payload_too_short() {
        let short = URL_SAFE_NO_PAD.encode([0u8; SIGNATURE_LENGTH - 1]);
        let token = format!("{V3_PUBLIC_HEADER}{short}");

        assert_eq!(
            decode(&token, V3_PUBLIC_HEADER).unwrap_err(),
            PasetoError::PayloadTooShort {
                actual: SIGNATURE_LENGTH - 1,
                minimum: SIGNATURE_LENGTH
            }
        );

        assert!(matches!(
            decode(V3_PUBLIC_HEADER, V3_PUBLIC_HEADER).unwrap_err(),
            PasetoError::PayloadTooShort { actual: 0, .. }
        ));
    }

    #[test]
    fn test_signature_only_payload_has_empty_message() {
        let exact = URL_SAFE_NO_PAD.encode([7u8; SIGNATURE_LENGTH]);
        let decoded = decode(&format!("{V3_PUBLIC_HEADER}{exact}"), V3_PUBLIC_HEADER).unwrap();

        assert!(decoded.message().is_empty());
        assert_eq!(decoded.signature(), &[7u8; SIGNATURE_LENGTH][..]);
    }

    #[test]
    fn test_extra_segments_are_rejected() {
        let signature = sample_signature();
        let token = encode(V3_PUBLIC_HEADER, b"m", &signature, Some(&b"f"[..]));

        assert!(matches!(
            decode(&format!("{token}.extra"), V3_PUBLIC_HEADER).unwrap_err(),
            PasetoError::MalformedEncoding(_)
        ));
    }

    #[test]
    fn test_oversized_token_is_rejected() {
        let token = format!("{V3_PUBLIC_HEADER}{}", "A".repeat(MAX_TOKEN_SIZE));

        assert!(matches!(
            decode(&token, V3_PUBLIC_HEADER).unwrap_err(),
            PasetoError::TokenTooLarge { .. }
        ));
    }
}
