//! Tenant-aware connection checkout.
//!
//! Every tenant shares one pool. A checked-out connection has its
//! `search_path` pointed at the tenant's schema for exactly the duration of
//! the checkout, and is reset to `public` before it goes back to the pool.
//! A connection whose reset cannot be confirmed is closed instead.

use futures::future::BoxFuture;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres};
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tessera_core::{TenantId, UpstreamConfig};

use crate::error::PgError;
use crate::provision::SchemaProvisioner;

const SET_SEARCH_PATH: &str = "SELECT set_config('search_path', $1, false)";

/// Hands out connections already routed to a tenant's partition.
#[derive(Debug, Clone)]
pub struct ConnectionRouter {
    pool: PgPool,
    provisioner: SchemaProvisioner,
    /// Tenants known to be provisioned. Losing an entry only costs a
    /// redundant `ensure`.
    provisioned: Arc<RwLock<HashSet<TenantId>>>,
}

impl ConnectionRouter {
    /// Open the shared pool described by `config`.
    pub async fn connect(config: &UpstreamConfig) -> Result<Self, PgError> {
        let pool = PgPoolOptions::new()
            .min_connections(config.pool.min_connections)
            .max_connections(config.pool.max_connections)
            .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.pool.idle_timeout_seconds))
            .connect(&config.connection_string())
            .await?;

        tracing::info!(
            upstream = %config.redacted_target(),
            max_connections = config.pool.max_connections,
            "connected to upstream PostgreSQL"
        );

        Ok(Self::from_pool(pool))
    }

    /// Route over an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            provisioner: SchemaProvisioner::new(pool.clone()),
            pool,
            provisioned: Arc::default(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn provisioner(&self) -> &SchemaProvisioner {
        &self.provisioner
    }

    /// Check out a connection whose `search_path` is `tenant`.
    ///
    /// Provisions the tenant first if this router has not seen it yet.
    pub async fn acquire(&self, tenant: &TenantId) -> Result<TenantConnection, PgError> {
        tenant.revalidate()?;

        if !tenant.is_default() && !self.is_provisioned(tenant) {
            self.provisioner.ensure(tenant).await?;
            self.mark_provisioned(tenant);
        }

        let mut conn = self.pool.acquire().await.map_err(|err| match err {
            sqlx::Error::PoolTimedOut => {
                let timeout_secs = self.pool.options().get_acquire_timeout().as_secs();
                tracing::warn!(tenant = %tenant, timeout_secs, "connection pool exhausted");
                PgError::PoolExhausted { timeout_secs }
            }
            other => PgError::Database(other),
        })?;

        if let Err(err) = sqlx::query(SET_SEARCH_PATH)
            .bind(tenant.as_str())
            .execute(&mut *conn)
            .await
        {
            conn.close_on_drop();
            return Err(err.into());
        }

        tracing::trace!(tenant = %tenant, "connection routed");
        Ok(TenantConnection {
            conn,
            tenant: tenant.clone(),
            released: false,
        })
    }

    /// Reset and return a connection. Equivalent to
    /// [`TenantConnection::release`].
    pub async fn release(&self, conn: TenantConnection) {
        conn.release().await;
    }

    /// Run `work` on a connection routed to `tenant`, releasing it afterward
    /// on every exit path.
    ///
    /// ```rust,ignore
    /// let count: i64 = router
    ///     .with_connection(&tenant, |conn| {
    ///         Box::pin(async move {
    ///             Ok(sqlx::query_scalar("SELECT count(*) FROM users")
    ///                 .fetch_one(conn)
    ///                 .await?)
    ///         })
    ///     })
    ///     .await?;
    /// ```
    pub async fn with_connection<T, F>(&self, tenant: &TenantId, work: F) -> Result<T, PgError>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, PgError>>,
    {
        let mut conn = self.acquire(tenant).await?;
        let result = work(&mut *conn).await;
        conn.release().await;
        result
    }

    /// Whether `tenant` is cached as provisioned.
    pub fn is_provisioned(&self, tenant: &TenantId) -> bool {
        self.provisioned
            .read()
            .map(|set| set.contains(tenant))
            .unwrap_or(false)
    }

    fn mark_provisioned(&self, tenant: &TenantId) {
        if let Ok(mut set) = self.provisioned.write() {
            set.insert(tenant.clone());
        }
    }
}

/// A pooled connection routed to one tenant.
///
/// Dereferences to [`PgConnection`]. Call [`TenantConnection::release`] when
/// done; a connection dropped without release is closed rather than returned
/// to the pool with a tenant `search_path`.
pub struct TenantConnection {
    conn: PoolConnection<Postgres>,
    tenant: TenantId,
    released: bool,
}

impl TenantConnection {
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    /// Reset `search_path` to `public` and return the connection to the pool.
    ///
    /// If the reset fails the connection is closed instead.
    pub async fn release(mut self) {
        let reset = sqlx::query(SET_SEARCH_PATH)
            .bind(TenantId::public().as_str())
            .execute(&mut *self.conn)
            .await;

        if let Err(err) = reset {
            tracing::warn!(
                tenant = %self.tenant,
                error = %err,
                "search_path reset failed, closing connection"
            );
            self.conn.close_on_drop();
        }
        self.released = true;
    }
}

impl Deref for TenantConnection {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for TenantConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl Drop for TenantConnection {
    fn drop(&mut self) {
        if !self.released {
            tracing::debug!(tenant = %self.tenant, "connection dropped without release, closing");
            self.conn.close_on_drop();
        }
    }
}

impl std::fmt::Debug for TenantConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantConnection")
            .field("tenant", &self.tenant)
            .field("released", &self.released)
            .finish()
    }
}
