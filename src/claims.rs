//! Claim sets carried inside `v3.public` tokens.
//!
//! Claims serialize to compact JSON with keys in alphabetical order. The
//! registered temporal claims (`exp`, `nbf`, `iat`) are RFC 3339 timestamps
//! in UTC. Any claim this crate does not know about is kept as-is.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{Error as _, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::error::{PasetoError, Result};

pub const ISSUER: &str = "iss";
pub const SUBJECT: &str = "sub";
pub const AUDIENCE: &str = "aud";
pub const EXPIRATION: &str = "exp";
pub const NOT_BEFORE: &str = "nbf";
pub const ISSUED_AT: &str = "iat";
pub const TOKEN_ID: &str = "jti";

const TEMPORAL_CLAIMS: [&str; 3] = [EXPIRATION, NOT_BEFORE, ISSUED_AT];

/// A single claim value.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    String(String),
    Integer(i64),
    Timestamp(OffsetDateTime),
    Map(BTreeMap<String, ClaimValue>),
    /// Booleans, floats, arrays and null, carried through untouched.
    Other(Value),
}

impl ClaimValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ClaimValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<OffsetDateTime> {
        match self {
            ClaimValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ClaimValue>> {
        match self {
            ClaimValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Whether this value is, or has nested inside it, a timestamp.
    fn holds_timestamp(&self) -> bool {
        match self {
            ClaimValue::Timestamp(_) => true,
            ClaimValue::Map(map) => map.values().any(ClaimValue::holds_timestamp),
            _ => false,
        }
    }

    /// Convert an untyped JSON value. Strings stay strings, whatever they
    /// look like; only registered temporal claims become timestamps.
    fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => ClaimValue::String(s),
            Value::Number(n) if n.is_i64() => match n.as_i64() {
                Some(i) => ClaimValue::Integer(i),
                None => ClaimValue::Other(Value::Number(n)),
            },
            Value::Object(map) => ClaimValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, ClaimValue::from_json(v)))
                    .collect(),
            ),
            other => ClaimValue::Other(other),
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::String(value.to_owned())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::String(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Integer(value)
    }
}

impl From<OffsetDateTime> for ClaimValue {
    fn from(value: OffsetDateTime) -> Self {
        ClaimValue::Timestamp(truncate_to_seconds(value))
    }
}

impl From<BTreeMap<String, ClaimValue>> for ClaimValue {
    fn from(value: BTreeMap<String, ClaimValue>) -> Self {
        ClaimValue::Map(value)
    }
}

impl From<Value> for ClaimValue {
    fn from(value: Value) -> Self {
        ClaimValue::from_json(value)
    }
}

impl Serialize for ClaimValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ClaimValue::String(s) => serializer.serialize_str(s),
            ClaimValue::Integer(n) => serializer.serialize_i64(*n),
            ClaimValue::Timestamp(ts) => {
                let formatted = format_timestamp(*ts).map_err(S::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            ClaimValue::Map(map) => map.serialize(serializer),
            ClaimValue::Other(value) => value.serialize(serializer),
        }
    }
}

/// Claims contained within a token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimSet {
    claims: BTreeMap<String, ClaimValue>,
}

impl ClaimSet {
    /// Create a new empty claims set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a claim.
    ///
    /// Only `exp`, `nbf` and `iat` hold timestamps, since those are the only
    /// names read back as timestamps when a token is parsed. Any other claim
    /// that needs a point in time should store it as an RFC 3339 string.
    ///
    /// # Errors
    /// * `DuplicateClaim` if the name is already present
    /// * `ClaimTypeMismatch` if a temporal claim is given a non-timestamp
    ///   value, or any other claim is given a timestamp (at any depth)
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Result<()> {
        let name = name.into();
        if self.claims.contains_key(&name) {
            return Err(PasetoError::DuplicateClaim(name));
        }

        let value = value.into();
        if TEMPORAL_CLAIMS.contains(&name.as_str()) {
            if value.as_timestamp().is_none() {
                return Err(Self::mismatch(&name, "timestamp"));
            }
        } else if value.holds_timestamp() {
            return Err(Self::mismatch(&name, "string, integer, map or JSON value"));
        }

        self.claims.insert(name, value);
        Ok(())
    }

    /// Set or replace a claim.
    fn replace(&mut self, name: &str, value: ClaimValue) {
        self.claims.insert(name.to_owned(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<ClaimValue> {
        self.claims.remove(name)
    }

    /// Set the issuer claim
    pub fn set_issuer(&mut self, issuer: impl Into<String>) {
        self.replace(ISSUER, ClaimValue::String(issuer.into()));
    }

    /// Set the subject claim
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.replace(SUBJECT, ClaimValue::String(subject.into()));
    }

    /// Set the audience claim
    pub fn set_audience(&mut self, audience: impl Into<String>) {
        self.replace(AUDIENCE, ClaimValue::String(audience.into()));
    }

    /// Set the token identifier
    pub fn set_token_id(&mut self, jti: impl Into<String>) {
        self.replace(TOKEN_ID, ClaimValue::String(jti.into()));
    }

    /// Set the expiration time, truncated to whole seconds.
    pub fn set_expiration(&mut self, exp: OffsetDateTime) {
        self.replace(EXPIRATION, ClaimValue::from(exp));
    }

    /// Set the not-before time, truncated to whole seconds.
    pub fn set_not_before(&mut self, nbf: OffsetDateTime) {
        self.replace(NOT_BEFORE, ClaimValue::from(nbf));
    }

    /// Set the issued-at time, truncated to whole seconds.
    pub fn set_issued_at(&mut self, iat: OffsetDateTime) {
        self.replace(ISSUED_AT, ClaimValue::from(iat));
    }

    /// Raw access to a claim value.
    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.claims.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.claims.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, name: &str) -> Result<&ClaimValue> {
        self.claims
            .get(name)
            .ok_or_else(|| PasetoError::MissingClaim(name.to_owned()))
    }

    fn mismatch(name: &str, expected: &'static str) -> PasetoError {
        PasetoError::ClaimTypeMismatch {
            claim: name.to_owned(),
            expected,
        }
    }

    /// Look up a string claim.
    ///
    /// # Errors
    /// `MissingClaim` if absent, `ClaimTypeMismatch` if the value is not a
    /// string. Numbers are never converted.
    pub fn get_string(&self, name: &str) -> Result<&str> {
        self.require(name)?
            .as_str()
            .ok_or_else(|| Self::mismatch(name, "string"))
    }

    /// Look up an integer claim. Same errors as [`Self::get_string`].
    pub fn get_i64(&self, name: &str) -> Result<i64> {
        self.require(name)?
            .as_i64()
            .ok_or_else(|| Self::mismatch(name, "integer"))
    }

    /// Look up a timestamp claim. Only `exp`, `nbf` and `iat` can hold one.
    pub fn get_timestamp(&self, name: &str) -> Result<OffsetDateTime> {
        self.require(name)?
            .as_timestamp()
            .ok_or_else(|| Self::mismatch(name, "timestamp"))
    }

    pub fn get_map(&self, name: &str) -> Result<&BTreeMap<String, ClaimValue>> {
        self.require(name)?
            .as_map()
            .ok_or_else(|| Self::mismatch(name, "map"))
    }

    fn optional_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ClaimValue::as_str)
    }

    fn optional_timestamp(&self, name: &str) -> Option<OffsetDateTime> {
        self.get(name).and_then(ClaimValue::as_timestamp)
    }

    // Getters
    pub fn issuer(&self) -> Option<&str> {
        self.optional_string(ISSUER)
    }
    pub fn subject(&self) -> Option<&str> {
        self.optional_string(SUBJECT)
    }
    pub fn audience(&self) -> Option<&str> {
        self.optional_string(AUDIENCE)
    }
    pub fn token_id(&self) -> Option<&str> {
        self.optional_string(TOKEN_ID)
    }
    pub fn expiration(&self) -> Option<OffsetDateTime> {
        self.optional_timestamp(EXPIRATION)
    }
    pub fn not_before(&self) -> Option<OffsetDateTime> {
        self.optional_timestamp(NOT_BEFORE)
    }
    pub fn issued_at(&self) -> Option<OffsetDateTime> {
        self.optional_timestamp(ISSUED_AT)
    }

    /// Check `exp` and `nbf` against `now`.
    ///
    /// A token is expired from its expiration instant onwards and valid from
    /// its not-before instant onwards. `iat` is not checked here.
    pub fn validate_temporal(&self, now: OffsetDateTime) -> Result<()> {
        if let Some(exp) = self.expiration() {
            if now >= exp {
                return Err(PasetoError::Expired);
            }
        }

        if let Some(nbf) = self.not_before() {
            if now < nbf {
                return Err(PasetoError::NotYetValid);
            }
        }

        Ok(())
    }

    /// Serialize to compact JSON with alphabetically ordered keys.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.claims)?)
    }

    /// Parse a JSON object of claims.
    ///
    /// Repeated top-level names are rejected. Temporal claims must be
    /// RFC 3339 strings.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        let ClaimEntries(entries) = serde_json::from_slice(bytes)?;

        let mut claims = ClaimSet::new();
        for (name, value) in entries {
            let value = if TEMPORAL_CLAIMS.contains(&name.as_str()) {
                ClaimValue::Timestamp(parse_timestamp(&name, &value)?)
            } else {
                ClaimValue::from_json(value)
            };

            if claims.claims.contains_key(&name) {
                return Err(PasetoError::DuplicateClaim(name));
            }
            claims.claims.insert(name, value);
        }

        Ok(claims)
    }

    /// Render the claims as a pretty-printed JSON document.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.claims)?)
    }
}

impl Serialize for ClaimSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.claims.serialize(serializer)
    }
}

/// Top-level JSON members in document order, duplicates included.
struct ClaimEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for ClaimEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ClaimEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of claims")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(ClaimEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Normalize to UTC at whole-second precision. A value with no UTC
/// equivalent keeps its offset and fails later, at serialization.
fn truncate_to_seconds(ts: OffsetDateTime) -> OffsetDateTime {
    let utc = ts.checked_to_offset(UtcOffset::UTC).unwrap_or(ts);
    utc.replace_nanosecond(0).unwrap_or(utc)
}

fn format_timestamp(ts: OffsetDateTime) -> Result<String> {
    ts.checked_to_offset(UtcOffset::UTC)
        .ok_or_else(|| PasetoError::MalformedClaims(format!("Timestamp {ts} has no UTC equivalent")))?
        .format(&Rfc3339)
        .map_err(|e| PasetoError::MalformedClaims(format!("Unrepresentable timestamp: {e}")))
}

fn parse_timestamp(name: &str, value: &Value) -> Result<OffsetDateTime> {
    let text = value.as_str().ok_or_else(|| {
        PasetoError::MalformedClaims(format!("Claim '{name}' must be an RFC 3339 string"))
    })?;

    OffsetDateTime::parse(text, &Rfc3339)
        .map_err(|e| PasetoError::MalformedClaims(format!("Claim '{name}': {e}")))?
        .checked_to_offset(UtcOffset::UTC)
        .ok_or_else(|| PasetoError::MalformedClaims(format!("Claim '{name}' is out of range")))
}
