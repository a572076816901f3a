//! Client-side token claims decoding
//!
//! The payload segment of a bearer token is read without any signature
//! check. The server validates every request independently, so the claims
//! are only used to decide what to display (current user, role-gated
//! actions). Any malformed input decodes to `None`, which callers treat as
//! an anonymous session.

use base64::Engine;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Standard alphabet, padded input, lenient about trailing bits
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// The `sub` claim, if it is a non-empty string
    pub fn subject(&self) -> Option<&str> {
        self.non_empty_str("sub")
    }

    /// Display identity of the token holder: `sub`, then `email`
    pub fn email(&self) -> Option<&str> {
        self.subject().or_else(|| self.non_empty_str("email"))
    }

    /// Role carried by the token, resolved through `policy`
    pub fn role(&self, policy: RolePolicy) -> Option<Role> {
        policy.resolve(self.raw_role())
    }

    /// `role` if set, otherwise the first entry of `roles`
    pub fn raw_role(&self) -> Option<&str> {
        self.non_empty_str("role").or_else(|| {
            self.0
                .get("roles")
                .and_then(Value::as_array)
                .and_then(|roles| roles.first())
                .and_then(Value::as_str)
                .filter(|role| !role.is_empty())
        })
    }

    /// The `exp` claim as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.0.get("exp")?;
        let secs = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;
        DateTime::from_timestamp(secs, 0)
    }

    /// Whether `exp` lies at or before `now`. Tokens without `exp` never expire here.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }

    fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Decode the payload segment of `token`
///
/// Returns `None` unless the token has exactly three dot-separated
/// segments whose middle one is base64url-encoded JSON describing an
/// object.
pub fn decode(token: &str) -> Option<Claims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let mut payload: String = segments[1]
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let remainder = payload.len() % 4;
    if remainder != 0 {
        payload.extend(std::iter::repeat_n('=', 4 - remainder));
    }

    let bytes = PAYLOAD_ENGINE.decode(payload.as_bytes()).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(Claims(map)),
        _ => None,
    }
}

/// Name of a role granted by the server
///
/// The set is open-ended; only `USER` and `ADMIN` carry meaning on the
/// client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const USER: &'static str = "USER";
    pub const ADMIN: &'static str = "ADMIN";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn user() -> Self {
        Self::new(Self::USER)
    }

    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How a missing or unrecognised role claim is resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolePolicy {
    /// Any role claim is accepted as-is; no claim means `USER`
    #[default]
    DefaultUser,
    /// Only `USER` and `ADMIN` are recognised; anything else means no role
    KnownOnly,
}

impl RolePolicy {
    /// Resolve a raw role claim
    pub fn resolve(self, raw: Option<&str>) -> Option<Role> {
        match self {
            Self::DefaultUser => Some(raw.map_or_else(Role::user, Role::new)),
            Self::KnownOnly => match raw {
                Some(Role::ADMIN) => Some(Role::admin()),
                Some(Role::USER) => Some(Role::user()),
                _ => None,
            },
        }
    }
}

/// Decode `token` and resolve its role in one step
///
/// An absent or undecodable token has no role under either policy.
pub fn role_of(token: Option<&str>, policy: RolePolicy) -> Option<Role> {
    decode(token?)?.role(policy)
}
