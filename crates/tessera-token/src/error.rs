//! Error types for session tokens.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while issuing or verifying session tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token is malformed, has a bad signature, uses another algorithm,
    /// or carries claims that do not decode.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token verified but its expiry is not in the future.
    #[error("token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    /// The token could not be signed.
    #[error("failed to sign token: {0}")]
    SigningFailed(String),

    /// The requested claim name is not one the token carries.
    #[error("unknown claim: {0}")]
    UnknownClaim(String),
}

impl TokenError {
    /// Whether the caller should be treated as unauthenticated.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, TokenError::InvalidToken(_) | TokenError::Expired { .. })
    }
}
