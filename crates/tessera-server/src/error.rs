//! Error type rendered at the HTTP boundary.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tessera_core::TenantError;
use tessera_pg::PgError;
use tessera_token::TokenError;
use thiserror::Error;

const RETRY_AFTER_SECS: &str = "1";

/// Errors returned by handlers and middleware.
///
/// Rendered as `{"error": CODE, "message": text}` with the matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid tenant: {0}")]
    InvalidTenant(#[from] TenantError),

    #[error("{0}")]
    BadRequest(String),

    #[error("user already exists: {email}")]
    DuplicateUser { email: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    /// The token was minted for another tenant than the request's.
    #[error("token was issued for {token_tenant}, not {request_tenant}")]
    TenantMismatch {
        token_tenant: String,
        request_tenant: String,
    },

    #[error("{0}")]
    Forbidden(String),

    #[error("tenant provisioning failed")]
    ProvisioningFailed,

    /// Retryable: no database connection became free in time. Rendered with
    /// a `Retry-After` header.
    #[error("service temporarily unavailable")]
    PoolExhausted,

    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidTenant(_) | ApiError::BadRequest(_) | ApiError::DuplicateUser { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials
            | ApiError::MissingToken
            | ApiError::InvalidToken
            | ApiError::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiError::TenantMismatch { .. } | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::ProvisioningFailed | ApiError::PoolExhausted | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidTenant(_) => "INVALID_TENANT",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::DuplicateUser { .. } => "DUPLICATE_USER",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::MissingToken => "UNAUTHORIZED",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::TokenExpired => "TOKEN_EXPIRED",
            ApiError::TenantMismatch { .. } => "TENANT_MISMATCH",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::ProvisioningFailed => "PROVISIONING_FAILED",
            ApiError::PoolExhausted => "POOL_EXHAUSTED",
            ApiError::Internal => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        let mut response = (self.status(), Json(body)).into_response();
        if matches!(self, ApiError::PoolExhausted) {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
        }
        response
    }
}

impl From<PgError> for ApiError {
    fn from(err: PgError) -> Self {
        match err {
            PgError::InvalidTenant(e) => ApiError::InvalidTenant(e),
            PgError::DuplicateUser { email } => ApiError::DuplicateUser { email },
            PgError::PoolExhausted { .. } => ApiError::PoolExhausted,
            PgError::ProvisioningFailed { ref tenant, .. } => {
                tracing::error!(tenant = %tenant, error = %err, "provisioning failed");
                ApiError::ProvisioningFailed
            }
            PgError::UserNotFound { .. } | PgError::Database(_) => {
                tracing::error!(error = %err, "database error");
                ApiError::Internal
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired { .. } => ApiError::TokenExpired,
            TokenError::InvalidToken(reason) => {
                tracing::debug!(reason = %reason, "rejected token");
                ApiError::InvalidToken
            }
            TokenError::SigningFailed(_) | TokenError::UnknownClaim(_) => {
                tracing::error!(error = %err, "token service error");
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
