//! Idempotent creation of tenant partitions.

use sqlx::PgPool;
use tessera_core::TenantId;

use crate::error::{PgError, is_already_exists};

/// Columns of every tenant's `users` table.
const USERS_COLUMNS: &str = "\
    id uuid PRIMARY KEY, \
    name text NOT NULL, \
    email text NOT NULL UNIQUE, \
    password_hash text NOT NULL, \
    role text NOT NULL DEFAULT 'USER' CHECK (role IN ('USER', 'ADMIN')), \
    created_at timestamptz NOT NULL DEFAULT now()";

const ENSURE_ATTEMPTS: u32 = 3;

/// Creates a tenant's schema and tables on first use.
///
/// Safe to call concurrently for the same tenant from any number of sessions
/// without an external lock: statements are `IF NOT EXISTS` and the errors
/// PostgreSQL still raises when two sessions race are treated as success.
#[derive(Debug, Clone)]
pub struct SchemaProvisioner {
    pool: PgPool,
}

impl SchemaProvisioner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensure the partition for `tenant` exists.
    ///
    /// The schema and its tables are created in one transaction, so a failure
    /// leaves nothing behind. The default tenant is never provisioned.
    pub async fn ensure(&self, tenant: &TenantId) -> Result<(), PgError> {
        if tenant.is_default() {
            return Ok(());
        }
        tenant.revalidate()?;

        let schema = tenant.quoted();
        let ddl = [
            format!("CREATE SCHEMA IF NOT EXISTS {schema}"),
            format!("CREATE TABLE IF NOT EXISTS {schema}.users ({USERS_COLUMNS})"),
        ];

        for attempt in 1..=ENSURE_ATTEMPTS {
            match self.create_partition(&ddl).await {
                Ok(()) => break,
                // The racing session committed both objects before our
                // statement failed, so the next attempt finds them.
                Err(err) if is_already_exists(&err) => {
                    tracing::debug!(tenant = %tenant, attempt, "lost provisioning race");
                }
                Err(err) => return Err(self.failure(tenant, err)),
            }
        }

        tracing::debug!(tenant = %tenant, "tenant partition ensured");
        Ok(())
    }

    async fn create_partition(&self, ddl: &[String]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for statement in ddl {
            sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(statement)).await?;
        }
        tx.commit().await
    }

    /// Create the `users` table of the default partition.
    ///
    /// Run once at startup so requests without a tenant header have a
    /// directory to work against.
    pub async fn prepare_default(&self) -> Result<(), PgError> {
        let tenant = TenantId::public();
        self.execute_tolerant(
            &tenant,
            &format!("CREATE TABLE IF NOT EXISTS public.users ({USERS_COLUMNS})"),
        )
        .await
    }

    /// Whether the schema for `tenant` exists.
    pub async fn exists(&self, tenant: &TenantId) -> Result<bool, PgError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.schemata WHERE schema_name = $1)",
        )
        .bind(tenant.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn execute_tolerant(&self, tenant: &TenantId, ddl: &str) -> Result<(), PgError> {
        match sqlx::raw_sql(ddl).execute(&self.pool).await {
            Ok(_) => Ok(()),
            Err(err) if is_already_exists(&err) => {
                tracing::debug!(tenant = %tenant, "lost provisioning race, object already exists");
                Ok(())
            }
            Err(err) => Err(self.failure(tenant, err)),
        }
    }

    fn failure(&self, tenant: &TenantId, err: sqlx::Error) -> PgError {
        match err {
            sqlx::Error::PoolTimedOut => PgError::PoolExhausted {
                timeout_secs: self.pool.options().get_acquire_timeout().as_secs(),
            },
            source => {
                tracing::error!(tenant = %tenant, error = %source, "provisioning failed");
                PgError::ProvisioningFailed {
                    tenant: tenant.to_string(),
                    source,
                }
            }
        }
    }
}
