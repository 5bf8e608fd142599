//! # PASETO v3.public tokens
//!
//! Issue and verify `v3.public` PASETO tokens: a JSON claim set signed with
//! ECDSA over NIST P-384 with SHA-384.
//!
//! ## Design Principles
//!
//! - **Stateless**: every operation is a plain function of its arguments,
//!   keys are immutable values and nothing is configured process-wide.
//! - **Strict parsing**: exact header match, unpadded base64url only, and
//!   a fixed-length signature split from the end of the payload.
//! - **Verify before trust**: claims are only parsed after the signature
//!   over the received bytes has checked out.
//!
//! ## Token Format
//!
//! ```text
//! v3.public.<base64url(message || signature)>[.<base64url(footer)>]
//! ```
//!
//! The signature covers `PAE(public_key, header, message, footer, implicit_assertion)`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use paseto_v3::{ClaimSet, KeyPair, OsRng, PasetoV3};
//! use time::OffsetDateTime;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Generate a new key pair
//! let keypair = KeyPair::generate(&mut OsRng)?;
//!
//! // Create claims
//! let mut claims = ClaimSet::new();
//! claims.set_subject("user123");
//! claims.set_issuer("my-service");
//! claims.set_expiration(OffsetDateTime::now_utc() + time::Duration::hours(1));
//! claims.insert("tenant_id", "org_abc123")?;
//!
//! // Sign the token
//! let token = PasetoV3::sign(keypair.secret_key(), &claims)?;
//!
//! // Verify the token
//! let verified = PasetoV3::verify(keypair.public_key(), &token)?;
//! assert_eq!(verified.claims().subject(), Some("user123"));
//! # Ok(())
//! # }
//! ```

pub mod claims;
pub mod cli;
pub mod codec;
pub mod error;
pub mod keys;
pub mod options;
pub mod pae;
pub mod signature;

pub use claims::{ClaimSet, ClaimValue};
pub use codec::{DecodedToken, V3_PUBLIC_HEADER};
pub use error::{PasetoError, Result};
pub use keys::{KeyPair, PublicKey, SecretKey};
pub use options::VerifyOptions;
pub use rand_core::{CryptoRngCore, OsRng};

use time::OffsetDateTime;

#[cfg(feature = "logging")]
use tracing::{debug, instrument, warn};

/// `v3.public` token issuance and verification
pub struct PasetoV3;

/// Verified token containing validated claims
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    claims: ClaimSet,
    footer: Option<Vec<u8>>,
    raw_token: String,
}

/// Where a verification attempt stopped, for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Decoding,
    SignatureChecking,
    ClaimsParsing,
    TemporalChecking,
}

impl VerifiedToken {
    /// Get the verified claims
    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// The footer bytes, if the token carried a footer segment
    pub fn footer(&self) -> Option<&[u8]> {
        self.footer.as_deref()
    }

    /// Get the raw token string
    pub fn raw_token(&self) -> &str {
        &self.raw_token
    }

    /// Extract the claims, consuming the verified token
    pub fn into_claims(self) -> ClaimSet {
        self.claims
    }
}

impl PasetoV3 {
    /// Sign claims to create a new token without footer or implicit assertion
    pub fn sign(secret_key: &SecretKey, claims: &ClaimSet) -> Result<String> {
        Self::sign_with_footer(secret_key, claims, None, None)
    }

    /// Sign claims, optionally binding a footer and an implicit assertion
    ///
    /// # Arguments
    /// * `secret_key` - The P-384 signing key
    /// * `claims` - Claims to serialize into the token message
    /// * `footer` - Optional footer, sent in the clear and covered by the signature
    /// * `implicit_assertion` - Optional data covered by the signature but never
    ///   sent; the verifier must supply the same bytes
    ///
    /// # Returns
    /// A `v3.public.` token string
    ///
    /// # Security
    /// `Some(b"")` and `None` produce different tokens on the wire but sign the
    /// same PAE input. Do not rely on the footer's presence alone to carry meaning.
    #[cfg_attr(
        feature = "logging",
        instrument(skip(secret_key, claims, footer, implicit_assertion))
    )]
    pub fn sign_with_footer(
        secret_key: &SecretKey,
        claims: &ClaimSet,
        footer: Option<&[u8]>,
        implicit_assertion: Option<&[u8]>,
    ) -> Result<String> {
        let message = claims.to_json_bytes()?;

        #[cfg(feature = "logging")]
        debug!("Serialized claims to {} bytes", message.len());

        Self::sign_message(secret_key, &message, footer, implicit_assertion)
    }

    /// Sign arbitrary message bytes.
    ///
    /// The message is placed in the token exactly as given.
    pub fn sign_message(
        secret_key: &SecretKey,
        message: &[u8],
        footer: Option<&[u8]>,
        implicit_assertion: Option<&[u8]>,
    ) -> Result<String> {
        let public_key = secret_key.public_key().to_bytes();
        let pae = pae::pae_encode_v3_public(
            &public_key,
            V3_PUBLIC_HEADER.as_bytes(),
            message,
            footer.unwrap_or_default(),
            implicit_assertion.unwrap_or_default(),
        )?;

        let signature = signature::sign(secret_key, &pae);
        let token = codec::encode(V3_PUBLIC_HEADER, message, &signature, footer);

        #[cfg(feature = "logging")]
        debug!(token_len = token.len(), "Generated v3.public token");

        Ok(token)
    }

    /// Verify a token against the wall clock with default options
    pub fn verify(public_key: &PublicKey, token: &str) -> Result<VerifiedToken> {
        Self::verify_with_options(public_key, token, &VerifyOptions::default(), None)
    }

    /// Verify a token and validate its claims
    ///
    /// Stages run in order and stop at the first failure: decoding,
    /// signature check, claims parsing, then temporal and rule checks.
    ///
    /// # Arguments
    /// * `public_key` - Key of the expected signer
    /// * `token` - The token string as received
    /// * `options` - Clock and claim expectations
    /// * `implicit_assertion` - The bytes the signer bound, if any
    ///
    /// # Errors
    /// Decoding errors (`TokenTooLarge`, `HeaderMismatch`, `MalformedEncoding`,
    /// `PayloadTooShort`), then `SignatureInvalid`, then claim errors
    /// (`MalformedClaims`, `DuplicateClaim`), then `MissingClaim`, `Expired`,
    /// `NotYetValid` and `ClaimMismatch`.
    ///
    /// # Security
    /// Claims are never parsed from a payload whose signature has not checked out.
    #[cfg_attr(
        feature = "logging",
        instrument(skip(public_key, token, options, implicit_assertion))
    )]
    pub fn verify_with_options(
        public_key: &PublicKey,
        token: &str,
        options: &VerifyOptions,
        implicit_assertion: Option<&[u8]>,
    ) -> Result<VerifiedToken> {
        let now = options.now();

        let (message, footer) = Self::verify_signature(public_key, token, implicit_assertion)?;

        let claims = ClaimSet::from_json_bytes(&message)
            .map_err(|e| reject(Stage::ClaimsParsing, e))?;

        options
            .validate(&claims, now)
            .map_err(|e| reject(Stage::TemporalChecking, e))?;

        #[cfg(feature = "logging")]
        debug!(claims = claims.len(), "Token verified");

        Ok(VerifiedToken {
            claims,
            footer,
            raw_token: token.to_string(),
        })
    }

    /// Check a token's signature and return the authenticated message and
    /// footer bytes, without interpreting the message.
    ///
    /// # Returns
    /// `(message, footer)`, where `footer` is `None` when the token has no
    /// footer segment
    pub fn verify_signature(
        public_key: &PublicKey,
        token: &str,
        implicit_assertion: Option<&[u8]>,
    ) -> Result<(Vec<u8>, Option<Vec<u8>>)> {
        let decoded =
            codec::decode(token, V3_PUBLIC_HEADER).map_err(|e| reject(Stage::Decoding, e))?;

        let pae = pae::pae_encode_v3_public(
            &public_key.to_bytes(),
            V3_PUBLIC_HEADER.as_bytes(),
            decoded.message(),
            decoded.footer().unwrap_or_default(),
            implicit_assertion.unwrap_or_default(),
        )
        .map_err(|e| reject(Stage::SignatureChecking, e))?;

        let valid = signature::verify(public_key, &pae, decoded.signature())
            .map_err(|e| reject(Stage::SignatureChecking, e))?;
        if !valid {
            return Err(reject(Stage::SignatureChecking, PasetoError::SignatureInvalid));
        }

        #[cfg(feature = "logging")]
        debug!("Signature verification successful");

        Ok(decoded.into_message_and_footer())
    }

    /// Validate claims at a given instant.
    pub fn validate_claims(claims: &ClaimSet, now: OffsetDateTime) -> Result<()> {
        claims.validate_temporal(now)
    }
}

fn reject(stage: Stage, err: PasetoError) -> PasetoError {
    #[cfg(feature = "logging")]
    warn!(?stage, error = %err, "Token rejected");
    #[cfg(not(feature = "logging"))]
    let _ = stage;
    err
}
