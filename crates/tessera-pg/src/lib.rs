//! # tessera-pg
//!
//! Schema-per-tenant storage on PostgreSQL.
//!
//! - [`SchemaProvisioner`] creates a tenant's schema and tables on first
//!   use, idempotently and without external locking.
//! - [`ConnectionRouter`] checks connections out of one shared pool with the
//!   session `search_path` pointed at the tenant, and puts it back to
//!   `public` on release.
//! - [`UserRepository`] stores user accounts inside each tenant.
//!
//! Identifiers reach DDL only after [`tessera_core::TenantId::revalidate`]
//! and always double-quoted; session switching binds the schema name as a
//! parameter to `set_config`.

pub mod error;
pub mod provision;
pub mod router;
pub mod users;

pub use error::PgError;
pub use provision::SchemaProvisioner;
pub use router::{ConnectionRouter, TenantConnection};
pub use users::{NewUser, UserRecord, UserRepository};
