//! # tessera-core
//!
//! Shared types for Tessera, a multi-tenant authentication service that
//! keeps each tenant's data in its own Postgres schema.
//!
//! - [`TenantId`]: normalized, validated tenant identifier. It is the only
//!   value ever interpolated into DDL, so construction enforces the
//!   `[a-z0-9_]{1,63}` allow-list.
//! - [`config`]: YAML configuration shared by every crate.

pub mod config;
pub mod tenant;

pub use config::{
    ConfigError, ObservabilityConfig, PoolConfig, ServerConfig, TenancyConfig, TesseraConfig,
    TokenConfig, UpstreamConfig,
};
pub use tenant::{
    DEFAULT_TENANT, MAX_IDENTIFIER_LEN, SCHEMA_PREFIX, TenantError, TenantId, normalize, validate,
};
