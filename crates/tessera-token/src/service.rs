//! Token issuance and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use std::collections::HashSet;
use std::fmt;
use tessera_core::{TenantId, TokenConfig};
use uuid::Uuid;

use crate::claims::{ClaimField, Claims, Role};
use crate::error::TokenError;
use crate::keys::SigningKey;

/// An opaque signed session token (compact JWT).
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Issues and verifies HS256 session tokens with the process-wide key.
#[derive(Debug, Clone)]
pub struct TokenService {
    key: SigningKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(key: SigningKey, ttl: Duration) -> Self {
        Self { key, ttl }
    }

    /// Build a service with a freshly generated key.
    pub fn from_config(config: &TokenConfig) -> Self {
        let ttl = i64::try_from(config.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self::new(SigningKey::generate(), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `user_id` in `tenant` with `role`.
    pub fn issue(
        &self,
        user_id: &str,
        tenant: &TenantId,
        role: Role,
    ) -> Result<SessionToken, TokenError> {
        self.issue_at(user_id, tenant, role, Utc::now())
    }

    /// Mint a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        user_id: &str,
        tenant: &TenantId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, TokenError> {
        let issued_at = now.timestamp();
        let claims = Claims {
            subject: user_id.to_string(),
            tenant_id: tenant.clone(),
            role,
            issued_at,
            expires_at: issued_at.saturating_add(self.ttl.num_seconds()),
            token_id: Some(Uuid::new_v4().to_string()),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, self.key.encoding())
            .map_err(|e| TokenError::SigningFailed(e.to_string()))?;

        tracing::debug!(tenant = %tenant, role = %role, "issued session token");
        Ok(SessionToken(token))
    }

    /// Verify signature, then expiry, and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify as if the current time were `now`.
    ///
    /// Claims are only decoded after the signature has been checked; a token
    /// that fails the check yields [`TokenError::InvalidToken`] and nothing
    /// else is read from it.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, self.key.decoding(), &validation())
            .map_err(|e| TokenError::InvalidToken(e.to_string()))?
            .claims;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired {
                expired_at: claims.expires_at_utc().unwrap_or(now),
            });
        }

        Ok(claims)
    }

    /// Verify the token and read a single claim.
    pub fn extract(&self, token: &str, field: ClaimField) -> Result<String, TokenError> {
        let claims = self.verify(token)?;
        claims
            .field(field)
            .ok_or_else(|| TokenError::UnknownClaim(format!("{field:?} is not present")))
    }

    /// True iff the token verifies, is unexpired, and belongs to
    /// `expected_user_id` exactly.
    pub fn validate(&self, token: &str, expected_user_id: &str) -> bool {
        match self.verify(token) {
            Ok(claims) => claims.subject == expected_user_id,
            Err(_) => false,
        }
    }
}

/// Signature and algorithm checks only; expiry is checked separately so it
/// can be reported as its own error without leeway.
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256];
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims = HashSet::new();
    validation
}
