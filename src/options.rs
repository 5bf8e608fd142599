//! Verification options applied after a token's signature has been checked.

use time::OffsetDateTime;

use crate::claims::{ClaimSet, AUDIENCE, EXPIRATION, ISSUED_AT, ISSUER, SUBJECT};
use crate::error::{PasetoError, Result};

/// Rules a verified claim set must satisfy.
///
/// The default requires an `exp` claim and validates against the wall clock
/// at the moment verification starts.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    now: Option<OffsetDateTime>,
    issuer: Option<String>,
    subject: Option<String>,
    audience: Option<String>,
    require_expiration: bool,
    require_issued_at: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            now: None,
            issuer: None,
            subject: None,
            audience: None,
            require_expiration: true,
            require_issued_at: false,
        }
    }
}

impl VerifyOptions {
    /// Default rules: `exp` required, wall clock, no expected values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate at a fixed instant instead of the wall clock.
    pub fn at(mut self, now: OffsetDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Require `iss` to equal `issuer` exactly.
    ///
    /// A missing `iss` fails with `ClaimMismatch` (actual `"none"`), a
    /// non-string one with `ClaimTypeMismatch`.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Require `sub` to equal `subject`. Same failure rules as [`Self::with_issuer`].
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Require `aud` to equal `audience`. Same failure rules as [`Self::with_issuer`].
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Accept tokens without an `exp` claim.
    pub fn allow_non_expiring(mut self) -> Self {
        self.require_expiration = false;
        self
    }

    /// Reject tokens without an `iat` claim.
    pub fn require_issued_at(mut self) -> Self {
        self.require_issued_at = true;
        self
    }

    /// The instant claims are validated against.
    pub fn now(&self) -> OffsetDateTime {
        self.now.unwrap_or_else(OffsetDateTime::now_utc)
    }

    /// Check presence requirements, temporal bounds and expected values.
    pub fn validate(&self, claims: &ClaimSet, now: OffsetDateTime) -> Result<()> {
        if self.require_expiration && !claims.contains(EXPIRATION) {
            return Err(PasetoError::MissingClaim(EXPIRATION.into()));
        }
        if self.require_issued_at && !claims.contains(ISSUED_AT) {
            return Err(PasetoError::MissingClaim(ISSUED_AT.into()));
        }

        claims.validate_temporal(now)?;

        expect_value(claims, ISSUER, self.issuer.as_deref())?;
        expect_value(claims, SUBJECT, self.subject.as_deref())?;
        expect_value(claims, AUDIENCE, self.audience.as_deref())?;

        Ok(())
    }
}

fn expect_value(claims: &ClaimSet, claim: &'static str, expected: Option<&str>) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };

    match claims.get(claim) {
        None => Err(PasetoError::ClaimMismatch {
            claim,
            expected: expected.to_string(),
            actual: "none".to_string(),
        }),
        Some(_) => {
            let actual = claims.get_string(claim)?;
            if actual == expected {
                Ok(())
            } else {
                Err(PasetoError::ClaimMismatch {
                    claim,
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                })
            }
        }
    }
}
