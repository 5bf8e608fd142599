//! Entry points for command-line front ends.
//!
//! Keys cross this boundary as standard (padded) base64 strings. Printing
//! and exit codes are left to the caller.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use time::{Duration, OffsetDateTime};

#[cfg(feature = "logging")]
use tracing::{debug, instrument};

use crate::claims::ClaimSet;
use crate::error::{PasetoError, Result};
use crate::keys::{KeyPair, PublicKey, SecretKey};
use crate::options::VerifyOptions;
use crate::{OsRng, PasetoV3};

/// Name of the claim that carries the signed message text.
pub const MESSAGE_CLAIM: &str = "message";

/// Expiration applied when the caller does not choose one.
pub const DEFAULT_EXPIRATION: Duration = Duration::minutes(5);

/// A freshly generated key pair in base64 form.
#[derive(Clone)]
pub struct EncodedKeyPair {
    pub secret_key: String,
    pub public_key: String,
}

impl fmt::Debug for EncodedKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedKeyPair")
            .field("secret_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Generate a key pair from the operating system RNG.
pub fn generate_encoded_keypair() -> Result<EncodedKeyPair> {
    let keypair = KeyPair::generate(&mut OsRng)?;

    Ok(EncodedKeyPair {
        secret_key: STANDARD.encode(&keypair.secret_key().to_bytes()[..]),
        public_key: STANDARD.encode(keypair.public_key().to_bytes()),
    })
}

/// Decode a standard (padded) base64 secret key.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
/// `InvalidKeyEncoding` if the text is not valid base64 or the bytes are not
/// a valid P-384 scalar, `InvalidKeyLength` if it decodes to anything other
/// than 48 bytes.
pub fn decode_secret_key(encoded: &str) -> Result<SecretKey> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| PasetoError::InvalidKeyEncoding)?;
    SecretKey::from_bytes(&bytes)
}

/// Decode a standard (padded) base64 compressed public key.
///
/// Same rules as [`decode_secret_key`], for a 49-byte SEC1 point.
pub fn decode_public_key(encoded: &str) -> Result<PublicKey> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| PasetoError::InvalidKeyEncoding)?;
    PublicKey::from_bytes(&bytes)
}

/// Sign `message` as a token valid from `now` until `now + expiration`.
///
/// The token carries `iat`, `nbf`, `exp` and a `message` claim, with no
/// footer and no implicit assertion.
///
/// # Arguments
/// * `message` - Text stored in the `message` claim
/// * `secret_key` - Standard base64 encoding of the 48-byte secret scalar
/// * `expiration` - Token lifetime, must be positive
/// * `now` - Issue time, used for `iat` and `nbf`
///
/// # Errors
/// `InvalidExpiration` when the lifetime is not positive or `now + expiration`
/// falls outside the representable date range. Key decoding errors as for
/// [`decode_secret_key`].
#[cfg_attr(feature = "logging", instrument(skip(message, secret_key)))]
pub fn sign_message(
    message: &str,
    secret_key: &str,
    expiration: Duration,
    now: OffsetDateTime,
) -> Result<String> {
    if !expiration.is_positive() {
        return Err(PasetoError::InvalidExpiration(format!(
            "lifetime must be positive, got {expiration}"
        )));
    }
    let expires_at = now.checked_add(expiration).ok_or_else(|| {
        PasetoError::InvalidExpiration(format!("{now} + {expiration} is out of range"))
    })?;

    let secret_key = decode_secret_key(secret_key)?;

    let mut claims = ClaimSet::new();
    claims.set_issued_at(now);
    claims.set_not_before(now);
    claims.set_expiration(expires_at);
    claims.insert(MESSAGE_CLAIM, message)?;

    #[cfg(feature = "logging")]
    debug!(%expiration, "Signing message token");

    PasetoV3::sign(&secret_key, &claims)
}

/// Verify a token at `now` and return its claims.
#[cfg_attr(feature = "logging", instrument(skip(token, public_key)))]
pub fn verify_token(token: &str, public_key: &str, now: OffsetDateTime) -> Result<ClaimSet> {
    let public_key = decode_public_key(public_key)?;
    let verified =
        PasetoV3::verify_with_options(&public_key, token.trim(), &VerifyOptions::new().at(now), None)?;
    Ok(verified.into_claims())
}
