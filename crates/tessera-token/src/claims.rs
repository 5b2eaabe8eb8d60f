//! Session token claims.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tessera_core::TenantId;

use crate::error::TokenError;

/// Authorization role carried in a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Tokens issued before roles existed have no `role` claim and decode as
    /// `User`.
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Payload of a session token.
///
/// Serialized as `{"sub", "tenantId", "role", "iat", "exp", "jti"}` with
/// timestamps in Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier.
    #[serde(rename = "sub")]
    pub subject: String,

    /// Normalized tenant the user authenticated against.
    #[serde(rename = "tenantId")]
    pub tenant_id: TenantId,

    #[serde(default)]
    pub role: Role,

    #[serde(rename = "iat")]
    pub issued_at: i64,

    #[serde(rename = "exp")]
    pub expires_at: i64,

    /// Random token id; keeps two tokens for the same subject distinct.
    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

impl Claims {
    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.issued_at, 0).single()
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expires_at, 0).single()
    }

    /// Expired means `exp` is not strictly after `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }

    /// Lifetime in seconds as minted.
    pub fn lifetime_seconds(&self) -> i64 {
        self.expires_at - self.issued_at
    }

    /// Read one claim as a string.
    pub fn field(&self, field: ClaimField) -> Option<String> {
        match field {
            ClaimField::Subject => Some(self.subject.clone()),
            ClaimField::TenantId => Some(self.tenant_id.to_string()),
            ClaimField::Role => Some(self.role.to_string()),
            ClaimField::IssuedAt => Some(self.issued_at.to_string()),
            ClaimField::ExpiresAt => Some(self.expires_at.to_string()),
            ClaimField::TokenId => self.token_id.clone(),
        }
    }
}

/// Claims addressable through [`crate::TokenService::extract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimField {
    Subject,
    TenantId,
    Role,
    IssuedAt,
    ExpiresAt,
    TokenId,
}

impl FromStr for ClaimField {
    type Err = TokenError;

    /// Accepts the wire names (`sub`, `tenantId`, `role`, `iat`, `exp`, `jti`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sub" => Ok(ClaimField::Subject),
            "tenantId" => Ok(ClaimField::TenantId),
            "role" => Ok(ClaimField::Role),
            "iat" => Ok(ClaimField::IssuedAt),
            "exp" => Ok(ClaimField::ExpiresAt),
            "jti" => Ok(ClaimField::TokenId),
            other => Err(TokenError::UnknownClaim(other.to_string())),
        }
    }
}
