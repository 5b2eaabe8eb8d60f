//! Error types for the Postgres layer.

use tessera_core::TenantError;
use thiserror::Error;

/// Errors that can occur while provisioning, routing or querying tenant data.
#[derive(Debug, Error)]
pub enum PgError {
    /// The tenant identifier failed re-validation before touching SQL.
    #[error("invalid tenant: {0}")]
    InvalidTenant(#[from] TenantError),

    /// Creating the tenant's schema or tables failed for a reason other than
    /// the objects already existing.
    #[error("failed to provision {tenant}: {source}")]
    ProvisioningFailed {
        tenant: String,
        #[source]
        source: sqlx::Error,
    },

    /// No pooled connection became available in time.
    #[error("no database connection available within {timeout_secs}s")]
    PoolExhausted { timeout_secs: u64 },

    /// A user with this email already exists in the tenant.
    #[error("user already exists: {email}")]
    DuplicateUser { email: String },

    #[error("user not found: {email}")]
    UserNotFound { email: String },

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl PgError {
    /// Whether a client may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PgError::PoolExhausted { .. })
    }
}

impl From<sqlx::Error> for PgError {
    fn from(err: sqlx::Error) -> Self {
        PgError::Database(err)
    }
}

/// SQLSTATEs PostgreSQL raises when a concurrent session created the same
/// object first, even under `IF NOT EXISTS`.
const ALREADY_EXISTS: [&str; 3] = [
    // duplicate_schema
    "42P06",
    // duplicate_table
    "42P07",
    // unique_violation on a catalog index
    "23505",
];

pub(crate) fn is_already_exists(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| ALREADY_EXISTS.contains(&code.as_ref()))
}
