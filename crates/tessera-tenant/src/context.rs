//! Request-scoped tenant binding.
//!
//! The active tenant lives in a tokio task-local that is set for exactly the
//! dynamic extent of one request's future. When the future completes, fails,
//! panics or is dropped, the binding disappears with it, so a worker thread
//! that goes on to poll another request's task can never observe a stale
//! tenant.
//!
//! Task-locals do not cross `tokio::spawn`. Work handed to another task must
//! carry the [`TenantId`] as a value, either explicitly or via
//! [`TenantContext::carry`].

use std::future::Future;
use tessera_core::TenantId;

tokio::task_local! {
    static CURRENT_TENANT: TenantId;
}

/// Access to the tenant bound to the current request.
pub struct TenantContext;

impl TenantContext {
    /// Run `future` with `tenant` bound as the current tenant.
    ///
    /// The binding is cleared when `future` finishes on any path.
    pub async fn bind<F>(tenant: TenantId, future: F) -> F::Output
    where
        F: Future,
    {
        if Self::is_bound() {
            tracing::warn!(
                outer = %Self::current(),
                inner = %tenant,
                "tenant context bound twice in one request"
            );
        }
        CURRENT_TENANT.scope(tenant, future).await
    }

    /// Synchronous variant of [`TenantContext::bind`] for blocking code.
    pub fn bind_sync<F, R>(tenant: TenantId, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        CURRENT_TENANT.sync_scope(tenant, f)
    }

    /// The tenant bound to the running request, or `public` when nothing is
    /// bound (startup, background maintenance).
    pub fn current() -> TenantId {
        CURRENT_TENANT.try_with(TenantId::clone).unwrap_or_default()
    }

    /// Whether a tenant is bound in the current scope.
    pub fn is_bound() -> bool {
        CURRENT_TENANT.try_with(|_| ()).is_ok()
    }

    /// Capture the current tenant by value and bind it around `future`.
    ///
    /// Use this before handing `future` to `tokio::spawn`.
    pub fn carry<F>(future: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        let tenant = Self::current();
        CURRENT_TENANT.scope(tenant, future)
    }
}
