//! P-384 key material for `v3.public` tokens.
//!
//! Secret keys are 48-byte big-endian scalars. Public keys are 49-byte SEC1
//! compressed points.

use std::fmt;

use p384::ecdsa;
use p384::elliptic_curve::zeroize::Zeroizing;
use rand_core::CryptoRngCore;

#[cfg(feature = "logging")]
use tracing::{debug, instrument};

use crate::error::{PasetoError, Result};

/// Length in bytes of an exported secret key.
pub const SECRET_KEY_LENGTH: usize = 48;

/// Length in bytes of an exported (compressed) public key.
pub const PUBLIC_KEY_LENGTH: usize = 49;

/// A signing key for creating tokens
#[derive(Clone)]
pub struct SecretKey(ecdsa::SigningKey);

/// A verifying key for validating tokens
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(ecdsa::VerifyingKey);

/// A P-384 key pair for signing and verification
#[derive(Clone)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl SecretKey {
    /// Import a secret key from its 48-byte scalar encoding.
    ///
    /// Zero and values not below the curve order are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(PasetoError::InvalidKeyLength {
                expected: SECRET_KEY_LENGTH,
                actual: bytes.len(),
            });
        }

        ecdsa::SigningKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKeyEncoding)
    }

    /// Export the scalar as 48 big-endian bytes.
    pub fn to_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LENGTH]> {
        let mut out = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }

    pub(crate) fn signing_key(&self) -> &ecdsa::SigningKey {
        &self.0
    }
}

impl PublicKey {
    /// Import a public key from its 49-byte compressed SEC1 encoding.
    ///
    /// Uncompressed points, the identity and off-curve points are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PUBLIC_KEY_LENGTH {
            return Err(PasetoError::InvalidKeyLength {
                expected: PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            });
        }

        if bytes[0] != 0x02 && bytes[0] != 0x03 {
            return Err(PasetoError::InvalidKeyEncoding);
        }

        ecdsa::VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKeyEncoding)
    }

    /// Export the point in compressed SEC1 form.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        let point = self.0.to_encoded_point(true);
        let mut out = [0u8; PUBLIC_KEY_LENGTH];
        out.copy_from_slice(point.as_bytes());
        out
    }

    pub(crate) fn verifying_key(&self) -> &ecdsa::VerifyingKey {
        &self.0
    }
}

impl KeyPair {
    /// Generate a new key pair from a cryptographically secure RNG.
    ///
    /// Candidate scalars outside the valid range are discarded and redrawn.
    ///
    /// # Errors
    /// `Entropy` if the RNG fails. This is not worth retrying.
    #[cfg_attr(feature = "logging", instrument(skip(rng)))]
    pub fn generate<R: CryptoRngCore>(rng: &mut R) -> Result<Self> {
        loop {
            let mut candidate = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
            rng.try_fill_bytes(&mut candidate[..])
                .map_err(|e| PasetoError::Entropy(e.to_string()))?;

            if let Ok(secret_key) = SecretKey::from_bytes(&candidate[..]) {
                #[cfg(feature = "logging")]
                debug!("Generated new P-384 key pair");

                return Ok(Self::from_secret_key(secret_key));
            }
        }
    }

    /// Rebuild a key pair from its secret half.
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key();
        Self {
            secret_key,
            public_key,
        }
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("algorithm", &"ECDSA-P384-SHA384")
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("algorithm", &"ECDSA-P384-SHA384")
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &"ECDSA-P384-SHA384")
            .field("secret_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn test_keypair_generation() {
        let mut rng = thread_rng();
        let keypair = KeyPair::generate(&mut rng).unwrap();

        let secret_bytes = keypair.secret_key().to_bytes();
        let public_bytes = keypair.public_key().to_bytes();

        assert_eq!(secret_bytes.len(), SECRET_KEY_LENGTH);
        assert_eq!(public_bytes.len(), PUBLIC_KEY_LENGTH);
        assert!(public_bytes[0] == 0x02 || public_bytes[0] == 0x03);

        let imported_secret = SecretKey::from_bytes(&secret_bytes[..]).unwrap();
        let imported_public = PublicKey::from_bytes(&public_bytes).unwrap();

        assert_eq!(imported_secret.public_key(), *keypair.public_key());
        assert_eq!(imported_public, *keypair.public_key());
        assert_eq!(imported_public.to_bytes(), public_bytes);
    }

    #[test]
    fn test_public_key_derivation_is_deterministic() {
        let mut rng = thread_rng();
        let keypair = KeyPair::generate(&mut rng).unwrap();

        let rebuilt = KeyPair::from_secret_key(keypair.secret_key().clone());
        assert_eq!(rebuilt.public_key(), keypair.public_key());
        assert_eq!(
            keypair.secret_key().public_key().to_bytes(),
            keypair.public_key().to_bytes()
        );
    }

    #[test]
    fn test_secret_key_rejects_bad_input() {
        assert_eq!(
            SecretKey::from_bytes(&[1u8; 32]).unwrap_err(),
            PasetoError::InvalidKeyLength {
                expected: SECRET_KEY_LENGTH,
                actual: 32
            }
        );

        // Zero is not a valid scalar
        assert_eq!(
            SecretKey::from_bytes(&[0u8; SECRET_KEY_LENGTH]).unwrap_err(),
            PasetoError::InvalidKeyEncoding
        );

        // Above the curve order
        assert_eq!(
            SecretKey::from_bytes(&[0xFFu8; SECRET_KEY_LENGTH]).unwrap_err(),
            PasetoError::InvalidKeyEncoding
        );
    }

    #[test]
    fn test_public_key_rejects_bad_input() {
        let mut rng = thread_rng();
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let mut bytes = keypair.public_key().to_bytes();

        assert!(matches!(
            PublicKey::from_bytes(&bytes[..48]).unwrap_err(),
            PasetoError::InvalidKeyLength { .. }
        ));

        // Uncompressed tag on a compressed-length buffer
        bytes[0] = 0x04;
        assert_eq!(
            PublicKey::from_bytes(&bytes).unwrap_err(),
            PasetoError::InvalidKeyEncoding
        );

        // Identity encoding padded to length
        let identity = [0u8; PUBLIC_KEY_LENGTH];
        assert_eq!(
            PublicKey::from_bytes(&identity).unwrap_err(),
            PasetoError::InvalidKeyEncoding
        );

        // x-coordinate beyond the field modulus
        let mut off_curve = [0xFFu8; PUBLIC_KEY_LENGTH];
        off_curve[0] = 0x02;
        assert_eq!(
            PublicKey::from_bytes(&off_curve).unwrap_err(),
            PasetoError::InvalidKeyEncoding
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let mut rng = thread_rng();
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let rendered = format!("{:?}", keypair);

        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("ECDSA-P384-SHA384"));
    }

    #[test]
    fn test_keys_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SecretKey>();
        assert_send_sync::<PublicKey>();
        assert_send_sync::<KeyPair>();
    }
}
