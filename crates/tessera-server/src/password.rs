//! Argon2id password hashing.
//!
//! Hashing is CPU-bound. Handlers use [`hash`] and [`check_login`], which run
//! it on the blocking pool with the request's tenant carried over by value.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::LazyLock;
use tessera_core::TenantId;
use tessera_tenant::TenantContext;

use crate::error::ApiError;

/// Verified in place of a stored hash when the account does not exist, so an
/// unknown email costs the same Argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("tessera unknown account").ok());

/// Hash `password` into a PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            ApiError::Internal
        })
}

/// Check `password` against a stored PHC string.
///
/// A stored value that does not parse counts as a mismatch.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        tracing::warn!("stored password hash is malformed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Check a login attempt against the account's stored hash, if any.
///
/// Without an account the dummy hash is verified and the result discarded.
pub fn verify_login(password: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(stored) => verify_password(password, stored),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                verify_password(password, dummy);
            }
            false
        }
    }
}

/// [`hash_password`] on the blocking pool.
pub async fn hash(tenant: &TenantId, password: String) -> Result<String, ApiError> {
    run_blocking(tenant, move || hash_password(&password)).await?
}

/// [`verify_login`] on the blocking pool.
pub async fn check_login(
    tenant: &TenantId,
    password: String,
    stored: Option<String>,
) -> Result<bool, ApiError> {
    run_blocking(tenant, move || verify_login(&password, stored.as_deref())).await
}

async fn run_blocking<T, F>(tenant: &TenantId, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let tenant = tenant.clone();
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(|| TenantContext::bind_sync(tenant, f)))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password task failed");
            ApiError::Internal
        })
}
