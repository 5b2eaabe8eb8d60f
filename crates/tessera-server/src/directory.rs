//! User storage as seen by the HTTP layer.

use async_trait::async_trait;
use tessera_core::TenantId;
use tessera_pg::{NewUser, PgError, UserRecord, UserRepository};
use tessera_token::Role;

/// Per-tenant user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create a user; an existing email in the tenant is
    /// [`PgError::DuplicateUser`].
    async fn register(&self, tenant: &TenantId, user: NewUser) -> Result<UserRecord, PgError>;

    async fn find_by_email(
        &self,
        tenant: &TenantId,
        email: &str,
    ) -> Result<Option<UserRecord>, PgError>;

    async fn list(&self, tenant: &TenantId) -> Result<Vec<UserRecord>, PgError>;

    async fn set_role(
        &self,
        tenant: &TenantId,
        email: &str,
        role: Role,
    ) -> Result<UserRecord, PgError>;
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn register(&self, tenant: &TenantId, user: NewUser) -> Result<UserRecord, PgError> {
        UserRepository::register(self, tenant, user).await
    }

    async fn find_by_email(
        &self,
        tenant: &TenantId,
        email: &str,
    ) -> Result<Option<UserRecord>, PgError> {
        UserRepository::find_by_email(self, tenant, email).await
    }

    async fn list(&self, tenant: &TenantId) -> Result<Vec<UserRecord>, PgError> {
        UserRepository::list(self, tenant).await
    }

    async fn set_role(
        &self,
        tenant: &TenantId,
        email: &str,
        role: Role,
    ) -> Result<UserRecord, PgError> {
        UserRepository::set_role(self, tenant, email, role).await
    }
}
