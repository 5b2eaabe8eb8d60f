//! Per-tenant user accounts.
//!
//! Every query runs on a connection routed through [`ConnectionRouter`], so
//! the unqualified `users` table always resolves inside the caller's tenant.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use tessera_core::TenantId;
use tessera_token::Role;
use uuid::Uuid;

use crate::error::PgError;
use crate::router::ConnectionRouter;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        let role = role.parse::<Role>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: e.into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Fields of a user to be registered. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// User storage inside each tenant's partition.
#[derive(Debug, Clone)]
pub struct UserRepository {
    router: ConnectionRouter,
}

impl UserRepository {
    pub fn new(router: ConnectionRouter) -> Self {
        Self { router }
    }

    /// Insert a user. An existing account with the same email in this tenant
    /// yields [`PgError::DuplicateUser`]; the check and insert are one
    /// statement.
    pub async fn register(&self, tenant: &TenantId, user: NewUser) -> Result<UserRecord, PgError> {
        let id = Uuid::new_v4();
        let email = user.email.clone();

        let row = self
            .router
            .with_connection(tenant, move |conn| {
                Box::pin(async move {
                    let sql = format!(
                        "INSERT INTO users (id, name, email, password_hash) \
                         VALUES ($1, $2, $3, $4) \
                         ON CONFLICT (email) DO NOTHING \
                         RETURNING {USER_COLUMNS}"
                    );
                    Ok(sqlx::query(&sql)
                        .bind(id)
                        .bind(&user.name)
                        .bind(&user.email)
                        .bind(&user.password_hash)
                        .fetch_optional(conn)
                        .await?)
                })
            })
            .await?;

        match row {
            Some(row) => {
                let record = UserRecord::from_row(&row)?;
                tracing::info!(tenant = %tenant, user_id = %record.id, "user registered");
                Ok(record)
            }
            None => Err(PgError::DuplicateUser { email }),
        }
    }

    pub async fn find_by_email(
        &self,
        tenant: &TenantId,
        email: &str,
    ) -> Result<Option<UserRecord>, PgError> {
        let email = email.to_string();
        let row = self
            .router
            .with_connection(tenant, move |conn| {
                Box::pin(async move {
                    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
                    Ok(sqlx::query(&sql).bind(&email).fetch_optional(conn).await?)
                })
            })
            .await?;

        Ok(row.as_ref().map(UserRecord::from_row).transpose()?)
    }

    /// All users of the tenant, oldest first.
    pub async fn list(&self, tenant: &TenantId) -> Result<Vec<UserRecord>, PgError> {
        let rows = self
            .router
            .with_connection(tenant, |conn| {
                Box::pin(async move {
                    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, email");
                    Ok(sqlx::query(&sql).fetch_all(conn).await?)
                })
            })
            .await?;

        rows.iter()
            .map(UserRecord::from_row)
            .collect::<Result<_, _>>()
            .map_err(PgError::from)
    }

    pub async fn set_role(
        &self,
        tenant: &TenantId,
        email: &str,
        role: Role,
    ) -> Result<UserRecord, PgError> {
        let target = email.to_string();
        let row = self
            .router
            .with_connection(tenant, move |conn| {
                Box::pin(async move {
                    let sql = format!(
                        "UPDATE users SET role = $1 WHERE email = $2 RETURNING {USER_COLUMNS}"
                    );
                    Ok(sqlx::query(&sql)
                        .bind(role.as_str())
                        .bind(&target)
                        .fetch_optional(conn)
                        .await?)
                })
            })
            .await?;

        match row {
            Some(row) => {
                let record = UserRecord::from_row(&row)?;
                tracing::info!(tenant = %tenant, user_id = %record.id, role = %role, "user role changed");
                Ok(record)
            }
            None => Err(PgError::UserNotFound {
                email: email.to_string(),
            }),
        }
    }
}
