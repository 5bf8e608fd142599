//! Error types for token issuance and verification.
//!
//! Every failure is reported with its specific kind so callers can tell a
//! malformed token apart from a forged one or from one that merely expired.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PasetoError>;

/// Errors that can occur during key handling, token issuance and verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasetoError {
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid key encoding")]
    InvalidKeyEncoding,

    #[error("Token header mismatch: expected '{expected}'")]
    HeaderMismatch { expected: &'static str },

    #[error("Malformed token encoding: {0}")]
    MalformedEncoding(String),

    #[error("Token payload too short: {actual} bytes, need at least {minimum}")]
    PayloadTooShort { actual: usize, minimum: usize },

    #[error("Malformed signature: expected {expected} bytes, got {actual}")]
    MalformedSignature { expected: usize, actual: usize },

    /// The token is well-formed but its signature does not match.
    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Malformed claims: {0}")]
    MalformedClaims(String),

    #[error("Duplicate claim: {0}")]
    DuplicateClaim(String),

    #[error("Claim '{claim}' is not a {expected}")]
    ClaimTypeMismatch {
        claim: String,
        expected: &'static str,
    },

    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    #[error("Token has expired")]
    Expired,

    #[error("Token is not yet valid (nbf claim)")]
    NotYetValid,

    #[error("Invalid {claim}: expected {expected}, got {actual}")]
    ClaimMismatch {
        claim: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Invalid expiration: {0}")]
    InvalidExpiration(String),

    #[error("Token too large: {size} bytes exceeds limit of {limit}")]
    TokenTooLarge { size: usize, limit: usize },

    #[error("PAE piece of {length} bytes exceeds the encodable range")]
    PaeLengthOverflow { length: usize },

    #[error("Entropy source failure: {0}")]
    Entropy(String),
}

impl From<base64::DecodeError> for PasetoError {
    fn from(err: base64::DecodeError) -> Self {
        PasetoError::MalformedEncoding(err.to_string())
    }
}

impl From<serde_json::Error> for PasetoError {
    fn from(err: serde_json::Error) -> Self {
        PasetoError::MalformedClaims(err.to_string())
    }
}
